use std::path::Path;

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Percent-encode filesystem-unsafe characters (`< > : " / \ | ? *` and control
/// characters) in a single path segment. Used by the file-backed name-mapper
/// variants and the file-lock backend to turn an opaque lock key into a safe
/// on-disk filename.
pub fn sanitize_path_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => {
                out.push_str(&format!("%{:02X}", ch as u32));
            }
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
