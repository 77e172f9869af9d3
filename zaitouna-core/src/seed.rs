//! Seeded content for new and first-run exhibitions.

use crate::layout::{self, LayoutPolicy};
use crate::model::{Exhibition, ExhibitionId, Narrative, NarrativeId, Point, VillageContext};

/// Number of narratives a fresh exhibition starts with.
pub const DEFAULT_NARRATIVE_COUNT: usize = 12;

pub const DEFAULT_EXHIBITION_ID: &str = "ex-1";
pub const DEFAULT_EXHIBITION_SLUG: &str = "zaitouna-bousid";

pub const DEFAULT_LOCATION: &str = "تونس";
pub const DEFAULT_STORY: &str = "بداية حكاية جديدة لجمع التراث الغذائي والروحي.";

const TITLES: [&str; 12] = [
    "صمت الأغصان",
    "عرق الجبين",
    "ذهبية العصر",
    "جذور لا تموت",
    "طقوس الفجر",
    "مباركة الأرض",
    "رائحة المطر",
    "أيدي الحكماء",
    "ذاكرة الشجرة",
    "شمس الشتاء",
    "حبات الأمل",
    "تعب مبارك",
];

const WRITERS: [&str; 5] = [
    "ياسين الطرابلسي",
    "سارة بن سالم",
    "منصف القيرواني",
    "أنيسة الجندوبي",
    "كمال الرياحي",
];

const DESCRIPTION: &str =
    "هذه السردية تستعرض تجليات الحصاد... ما لا تراه الأعين يراه القلب في لمعة الزيت.";

/// The twelve template narratives, laid out on a circle.
pub fn default_narratives() -> Vec<Narrative> {
    let mut items: Vec<Narrative> = (0..DEFAULT_NARRATIVE_COUNT)
        .map(|i| Narrative {
            id: NarrativeId::new(i as u64 + 1),
            title: TITLES[i % TITLES.len()].to_string(),
            writer: WRITERS[i % WRITERS.len()].to_string(),
            image: format!("https://picsum.photos/seed/olive-{i}/800/1000"),
            audio_url: format!(
                "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{}.mp3",
                i % 5 + 1
            ),
            description: DESCRIPTION.to_string(),
            x: 0.0,
            y: 0.0,
        })
        .collect();
    layout::apply(LayoutPolicy::Circle, &mut items);
    items
}

/// Template for a narrative added by a curator, placed at the canvas center.
pub fn new_narrative(id: NarrativeId) -> Narrative {
    let center = Point::center();
    Narrative {
        id,
        title: "عنوان جديد".to_string(),
        writer: "اسم الكاتب".to_string(),
        image: "https://picsum.photos/seed/new/800/1000".to_string(),
        audio_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
        description: "اكتب وصف السردية هنا...".to_string(),
        x: center.x,
        y: center.y,
    }
}

/// The exhibition shown when nothing has been stored yet.
pub fn default_exhibition() -> Exhibition {
    Exhibition {
        id: ExhibitionId::from(DEFAULT_EXHIBITION_ID),
        slug: DEFAULT_EXHIBITION_SLUG.to_string(),
        context: VillageContext {
            name: "قرية سيدي بوزيد".to_string(),
            location: "الساحة الكبرى، تونس".to_string(),
            story: "في قلب تونس، حيث تضرب جذور الزيتون عميقاً في التاريخ، اجتمع السكان ليوثقوا لحظات الحصاد بهواتفهم. هذه هي سردية الزيت.".to_string(),
        },
        items: default_narratives(),
        created_at: chrono::Utc::now().timestamp_millis(),
        intro: None,
    }
}
