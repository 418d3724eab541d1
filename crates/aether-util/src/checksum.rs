//! Checksum *file* text parsing only. Computing the digest of an artifact is
//! outside this crate's scope; this module just extracts the hex digest a
//! remote repository published alongside an artifact (e.g. `foo.jar.sha1`).

/// Extract the hex digest from the first non-empty line of a checksum file.
///
/// BSD/GNU `sha1sum`-style lines look like `<hex>  <filename>`: take the
/// token before the first space. Some repositories instead publish
/// `<filename>= <hex>`: when the line matches that shape, take the token
/// after the last space.
pub fn extract_hash(contents: &str) -> Option<String> {
    let line = contents.lines().find(|l| !l.trim().is_empty())?.trim();
    if is_trailer_form(line) {
        line.rsplit(' ').next().map(str::to_string)
    } else {
        line.split(' ').next().map(str::to_string)
    }
}

/// Matches `^.+= [0-9A-Fa-f]+$`: anything, then `= `, then a bare hex run to
/// the end of the line.
fn is_trailer_form(line: &str) -> bool {
    let Some(eq_pos) = line.rfind('=') else {
        return false;
    };
    let (prefix, rest) = line.split_at(eq_pos);
    if prefix.is_empty() {
        return false;
    }
    let Some(hex) = rest.strip_prefix("= ") else {
        return false;
    };
    !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
}
