//! Free-text search and glob matching against a torrent's searchable
//! surface (name, category, tags, hash).

use qbproxy_core::model::Torrent;

/// Replace the punctuation the corpus treats as word separators with
/// spaces, then lower-case. Used to normalize both the query and each
/// torrent's searchable text before matching.
#[must_use]
pub fn normalize_search_text(input: &str) -> String {
    input
        .chars()
        .map(|c| if "._-[]()".contains(c) { ' ' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
}

fn searchable_surface(torrent: &Torrent) -> String {
    format!(
        "{} {} {} {}",
        torrent.name, torrent.category, torrent.tags, torrent.hash
    )
}

/// `FilterTorrentsBySearch`: matches if the normalized query is a substring
/// of the torrent's normalized surface, OR every whitespace-separated token
/// of the normalized query appears somewhere in it (fuzzy, AND-of-tokens).
#[must_use]
pub fn filter_torrents_by_search<'a>(torrents: &'a [Torrent], query: &str) -> Vec<&'a Torrent> {
    let normalized_query = normalize_search_text(query);
    let trimmed = normalized_query.trim();
    if trimmed.is_empty() {
        return torrents.iter().collect();
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    torrents
        .iter()
        .filter(|t| {
            let surface = normalize_search_text(&searchable_surface(t));
            surface.contains(trimmed) || tokens.iter().all(|token| surface.contains(token))
        })
        .collect()
}

/// `FilterTorrentsByGlob`: matches the torrent's name against a glob pattern
/// supporting `*`, `?`, and `[...]` character classes. Case-sensitive and
/// performs no punctuation normalization — a literal with no wildcards
/// matches only an exact-case occurrence of the name.
#[must_use]
pub fn filter_torrents_by_glob<'a>(torrents: &'a [Torrent], pattern: &str) -> Vec<&'a Torrent> {
    torrents.iter().filter(|t| glob_match(pattern, &t.name)).collect()
}

/// Minimal glob matcher: `*` matches any run of characters (including
/// none), `?` matches exactly one character, `[...]` matches any single
/// character in the bracketed class (no negation support, matching the
/// qBittorrent UI's own glob subset).
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, 0, &text, 0)
}

fn match_from(pattern: &[char], pi: usize, text: &[char], ti: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }
    match pattern[pi] {
        '*' => {
            for next_ti in ti..=text.len() {
                if match_from(pattern, pi + 1, text, next_ti) {
                    return true;
                }
            }
            false
        }
        '?' => ti < text.len() && match_from(pattern, pi + 1, text, ti + 1),
        '[' => {
            let Some(close) = pattern[pi..].iter().position(|&c| c == ']') else {
                return ti < text.len() && text[ti] == '[' && match_from(pattern, pi + 1, text, ti + 1);
            };
            let class: &[char] = &pattern[pi + 1..pi + close];
            ti < text.len() && class.contains(&text[ti]) && match_from(pattern, pi + close + 1, text, ti + 1)
        }
        literal => ti < text.len() && text[ti] == literal && match_from(pattern, pi + 1, text, ti + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::TorrentState;

    fn torrent(hash: &str, name: &str) -> Torrent {
        Torrent {
            hash: hash.into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: name.into(),
            state: TorrentState::Downloading,
            added_on: 0,
            completion_on: -1,
            progress: 0.0,
            dlspeed: 0,
            upspeed: 0,
            size: 0,
            downloaded: 0,
            uploaded: 0,
            ratio: 0.0,
            category: String::new(),
            tags: String::new(),
            tracker: String::new(),
            trackers: Vec::new(),
            save_path: String::new(),
            priority: 0,
            eta: -1,
            num_seeds: 0,
            num_leechs: 0,
            force_start: false,
            super_seeding: false,
            availability: 0.0,
            last_activity: 0,
        }
    }

    #[test]
    fn search_normalizes_punctuation_to_spaces() {
        let torrents = vec![torrent("1", "My.Movie-2024[1080p]")];
        let results = filter_torrents_by_search(&torrents, "movie 2024");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn search_matches_fuzzy_token_order_independent() {
        let torrents = vec![torrent("1", "The Matrix 1999")];
        let results = filter_torrents_by_search(&torrents, "1999 matrix");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn glob_matches_literal_only_exact_case() {
        let torrents = vec![torrent("1", "Movie"), torrent("2", "movie")];
        let results = filter_torrents_by_glob(&torrents, "Movie");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].hash, "1");
    }

    #[test]
    fn glob_matches_wildcards() {
        assert!(glob_match("Movie.*.mkv", "Movie.2024.mkv"));
        assert!(glob_match("Movie.???.mkv", "Movie.abc.mkv"));
        assert!(glob_match("Movie[12].mkv", "Movie1.mkv"));
        assert!(!glob_match("Movie[12].mkv", "Movie3.mkv"));
    }
}
