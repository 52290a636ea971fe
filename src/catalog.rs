use crate::models::{AnimeEntry, Task};

pub const VOTES_KEY: &str = "av_votes_v1";
pub const USER_KEY: &str = "av_user_v1";
pub const TASKS_KEY: &str = "av_tasks_v1";

const CATALOG: [(&str, &str, &str); 6] = [
    ("1", "Demon Slayer", "https://cdn.myanimelist.net/images/anime/1286/99889.jpg"),
    ("2", "Attack on Titan", "https://cdn.myanimelist.net/images/anime/10/47347.jpg"),
    ("3", "My Hero Academia", "https://cdn.myanimelist.net/images/anime/10/78745.jpg"),
    ("4", "Naruto", "https://cdn.myanimelist.net/images/anime/13/17405.jpg"),
    ("5", "One Piece", "https://cdn.myanimelist.net/images/anime/6/73245.jpg"),
    ("6", "Jujutsu Kaisen", "https://cdn.myanimelist.net/images/anime/1171/109222.jpg"),
];

pub fn anime_catalog() -> Vec<AnimeEntry> {
    CATALOG
        .iter()
        .map(|(id, title, image_url)| AnimeEntry {
            id: id.to_string(),
            title: title.to_string(),
            image_url: image_url.to_string(),
        })
        .collect()
}

pub fn is_known_anime(id: &str) -> bool {
    CATALOG.iter().any(|(known, _, _)| *known == id)
}

/// Task list used when nothing usable is stored yet.
pub fn default_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            title: "Complete Offer 1".to_string(),
            done: false,
            url: "https://example.com/offer1".to_string(),
        },
        Task {
            id: 2,
            title: "Complete Offer 2".to_string(),
            done: false,
            url: "https://example.com/offer2".to_string(),
        },
    ]
}
