//! Sample scrums used to seed an empty store.

use super::{DailyScrum, Theme};

pub fn samples() -> Vec<DailyScrum> {
    vec![
        DailyScrum::new(
            "Design",
            ["Cathy", "Daisy", "Simon", "Jonathan", "James", "Naomi"],
            1,
            Theme::Yellow,
        ),
        DailyScrum::new(
            "App Dev",
            ["Katie", "Gray", "Euna", "Luis", "Darla"],
            5,
            Theme::Orange,
        ),
        DailyScrum::new(
            "Web Dev",
            [
                "Chella", "Chris", "Christina", "Eden", "Karla", "Lindsey", "Aga", "Chad", "Jenn",
                "Sarah",
            ],
            5,
            Theme::Poppy,
        ),
    ]
}
