//! Material name normalization.
//!
//! Hosts disambiguate colliding names by appending a counter (`stone.001`),
//! and image-derived materials often keep the file extension
//! (`stone.png`). Library lookups compare names with these removed.

/// Image extensions stripped during normalization.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".tga"];

/// Digits in a host duplication counter (`.001`).
const COUNTER_DIGITS: usize = 3;

/// Return the base name of a material.
///
/// Strips trailing duplication counters and image extensions until none
/// remain, so `normalize(normalize(x)) == normalize(x)` for any input.
/// A name is never reduced to an empty string.
pub fn normalize(name: &str) -> String {
    let mut current = name;
    loop {
        match strip_once(current) {
            Some(next) if !next.is_empty() => current = next,
            _ => return current.to_string(),
        }
    }
}

fn strip_once(name: &str) -> Option<&str> {
    if let Some(head) = strip_counter(name) {
        return Some(head);
    }
    IMAGE_EXTENSIONS.iter().find_map(|ext| strip_suffix_ignore_case(name, ext))
}

fn strip_counter(name: &str) -> Option<&str> {
    let (head, tail) = name.rsplit_once('.')?;
    (tail.len() == COUNTER_DIGITS && tail.bytes().all(|b| b.is_ascii_digit())).then_some(head)
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = name.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        ".001",
        ".png",
        "stone",
        "stone.001",
        "stone.001.002",
        "stone.png",
        "stone.PNG.001",
        "default_pbr_cycles",
        "default_pbr_cycles.004",
        "water_0001",
        "glass.01",
        "tn.1234",
        "glass.1234.001",
        "ünïcode.png",
        "a.png.png",
    ];

    #[test]
    fn test_strips_counters_and_extensions() {
        assert_eq!(normalize("stone.001"), "stone");
        assert_eq!(normalize("stone.001.002"), "stone");
        assert_eq!(normalize("stone.PNG.001"), "stone");
        assert_eq!(normalize("default_pbr_cycles.004"), "default_pbr_cycles");
    }

    #[test]
    fn test_keeps_plain_names() {
        assert_eq!(normalize("stone"), "stone");
        assert_eq!(normalize("glass.01"), "glass.01");
        assert_eq!(normalize("water_0001"), "water_0001");
        assert_eq!(normalize("tn.1234"), "tn.1234");
        assert_eq!(normalize("glass.1234.001"), "glass.1234");
    }

    #[test]
    fn test_never_empties() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(".001"), ".001");
        assert_eq!(normalize(".png"), ".png");
    }

    #[test]
    fn test_idempotent() {
        for &s in SAMPLES {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
            assert_eq!(normalize(s), once, "not stable for {s:?}");
        }
    }
}
