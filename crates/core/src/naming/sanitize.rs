/// Characters that are reserved on at least one supported file system.
pub const RESERVED_CHARS: [char; 9] = ['/', '\\', '?', ':', '*', '<', '>', '"', '|'];

/// Replace every reserved character with `X`.
///
/// Applied to every output stem before it touches the file system.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { 'X' } else { c })
        .collect()
}
