/// A curriculum level shown on the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelInfo {
    pub tag: &'static str,
    pub description: &'static str,
}

pub const LEVELS: [LevelInfo; 12] = [
    LevelInfo {
        tag: "1A",
        description: "Basic greetings and introductions",
    },
    LevelInfo {
        tag: "1B",
        description: "Basic communication for daily life",
    },
    LevelInfo {
        tag: "2A",
        description: "Basic communication for daily life and Korean culture",
    },
    LevelInfo {
        tag: "2B",
        description: "Basic communication for daily life and Korean culture",
    },
    LevelInfo {
        tag: "3A",
        description: "Communicate in ordinary situations in Korean society",
    },
    LevelInfo {
        tag: "3B",
        description: "Communicate in ordinary situations in Korean society",
    },
    LevelInfo {
        tag: "4A",
        description: "Understand and use expressions in basic social situations",
    },
    LevelInfo {
        tag: "4B",
        description: "Understand and use expressions in basic social situations",
    },
    LevelInfo {
        tag: "5A",
        description: "Understand and use expressions in everyday social situations",
    },
    LevelInfo {
        tag: "5B",
        description: "Understand and use expressions in everyday social situations",
    },
    LevelInfo {
        tag: "6A",
        description: "Understand and use expressions in almost any social situation",
    },
    LevelInfo {
        tag: "6B",
        description: "Understand and use expressions in almost any social situation",
    },
];

pub fn find(tag: &str) -> Option<&'static LevelInfo> {
    LEVELS.iter().find(|level| level.tag.eq_ignore_ascii_case(tag))
}

pub fn position(tag: &str) -> Option<usize> {
    LEVELS
        .iter()
        .position(|level| level.tag.eq_ignore_ascii_case(tag))
}
