//! Where files go: the per-domain download layout and the parallel
//! `output_clean` tree used by the clean utility.

use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use url::Url;

pub const CLEAN_DIR: &str = "output_clean";
const DOWNLOAD_DIR_MARKER: &str = "downloaded_sites";
const OUTPUT_DIR_MARKER: &str = "output";

/// `<output_dir>/<host[:port]>/<url path>.md`
///
/// The path is taken without its leading and trailing slashes (`index` when
/// nothing is left), query and fragment are dropped, and `.`/`..` or empty
/// segments are removed so nothing lands outside the host directory.
pub fn markdown_path(output_dir: &Path, url: &Url) -> PathBuf {
    let mut host = url.host_str().unwrap_or("unknown-host").to_string();
    if let Some(port) = url.port() {
        host = format!("{host}:{port}");
    }

    let mut segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    if segments.is_empty() {
        segments.push("index");
    }

    let mut path = output_dir.join(host);
    for segment in &segments {
        path.push(segment);
    }

    if !path.to_string_lossy().ends_with(".md") {
        let mut with_ext = path.into_os_string();
        with_ext.push(".md");
        path = PathBuf::from(with_ext);
    }
    path
}

/// Write `content` to `path`, creating parent directories as needed.
pub async fn save_markdown(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Output path for a cleaned copy of `input`.
///
/// An explicit path wins. Otherwise a `downloaded_sites` directory in the
/// input's location is swapped for `output_clean` (every occurrence), then
/// the first `output` directory component is, and failing both the file
/// goes to `output_clean/` beside the input's parent directory.
pub fn clean_output_path(input: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(explicit) = explicit {
        return explicit.to_path_buf();
    }

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    if parent.to_string_lossy().contains(DOWNLOAD_DIR_MARKER) {
        return PathBuf::from(
            input
                .to_string_lossy()
                .replace(DOWNLOAD_DIR_MARKER, CLEAN_DIR),
        );
    }

    if parent
        .components()
        .any(|c| c.as_os_str() == OsStr::new(OUTPUT_DIR_MARKER))
    {
        let mut replaced = false;
        return input
            .components()
            .map(|c| match c {
                Component::Normal(name) if !replaced && name == OUTPUT_DIR_MARKER => {
                    replaced = true;
                    Component::Normal(OsStr::new(CLEAN_DIR))
                }
                other => other,
            })
            .collect();
    }

    let grandparent = parent.parent().unwrap_or_else(|| Path::new(""));
    let file_name = input.file_name().unwrap_or(input.as_os_str());
    grandparent.join(CLEAN_DIR).join(file_name)
}

/// Output path for `input` found under the directory `input_root` when the
/// caller named an explicit output directory: the relative layout is kept.
pub fn mirrored_output_path(input_root: &Path, input: &Path, output_root: &Path) -> PathBuf {
    match input.strip_prefix(input_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => output_root.join(relative),
        _ => output_root.join(input.file_name().unwrap_or(input.as_os_str())),
    }
}

/// `root` itself when it is a file, else every `*.md` file below it, sorted.
pub fn collect_markdown_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(root)?;
    if metadata.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension() == Some(OsStr::new("md")) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(url: &str) -> PathBuf {
        markdown_path(Path::new("output"), &Url::parse(url).unwrap())
    }

    #[test]
    fn nests_path_under_host() {
        assert_eq!(
            md("https://example.com/blog/post-1/"),
            PathBuf::from("output/example.com/blog/post-1.md")
        );
    }

    #[test]
    fn root_becomes_index() {
        assert_eq!(md("https://example.com/"), PathBuf::from("output/example.com/index.md"));
        assert_eq!(md("https://example.com"), PathBuf::from("output/example.com/index.md"));
    }

    #[test]
    fn keeps_existing_md_extension_and_port() {
        assert_eq!(
            md("http://localhost:8080/docs/readme.md"),
            PathBuf::from("output/localhost:8080/docs/readme.md")
        );
        assert_eq!(
            md("https://example.com/page.html?x=1#top"),
            PathBuf::from("output/example.com/page.html.md")
        );
    }

    #[test]
    fn never_escapes_the_host_directory() {
        let path = md("https://example.com/a/%2E%2E/..//b");
        assert!(path.starts_with("output/example.com"));
        assert!(!path.components().any(|c| c == Component::ParentDir));
    }

    #[test]
    fn clean_path_prefers_explicit_output() {
        let out = clean_output_path(
            Path::new("downloaded_sites/a.md"),
            Some(Path::new("custom/b.md")),
        );
        assert_eq!(out, PathBuf::from("custom/b.md"));
    }

    #[test]
    fn clean_path_swaps_downloaded_sites() {
        assert_eq!(
            clean_output_path(Path::new("data/downloaded_sites/example.com/a.md"), None),
            PathBuf::from("data/output_clean/example.com/a.md")
        );
    }

    #[test]
    fn clean_path_swaps_first_output_component() {
        assert_eq!(
            clean_output_path(Path::new("output/example.com/output/a.md"), None),
            PathBuf::from("output_clean/example.com/output/a.md")
        );
        // A directory that merely contains the word is not an output dir
        assert_eq!(
            clean_output_path(Path::new("site/my_output/a.md"), None),
            PathBuf::from("site/output_clean/a.md")
        );
    }

    #[test]
    fn clean_path_falls_back_beside_parent() {
        assert_eq!(
            clean_output_path(Path::new("/data/notes/a.md"), None),
            PathBuf::from("/data/output_clean/a.md")
        );
        assert_eq!(
            clean_output_path(Path::new("a.md"), None),
            PathBuf::from("output_clean/a.md")
        );
    }

    #[test]
    fn mirrored_path_keeps_layout() {
        assert_eq!(
            mirrored_output_path(
                Path::new("in"),
                Path::new("in/example.com/blog/a.md"),
                Path::new("out")
            ),
            PathBuf::from("out/example.com/blog/a.md")
        );
    }

    #[test]
    fn collects_markdown_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("example.com/blog")).unwrap();
        std::fs::write(root.join("example.com/index.md"), "x").unwrap();
        std::fs::write(root.join("example.com/blog/b.md"), "x").unwrap();
        std::fs::write(root.join("example.com/blog/notes.txt"), "x").unwrap();

        let files = collect_markdown_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("example.com/blog/b.md"),
                root.join("example.com/index.md"),
            ]
        );

        let single = collect_markdown_files(&root.join("example.com/index.md")).unwrap();
        assert_eq!(single, vec![root.join("example.com/index.md")]);
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.com/deep/page.md");
        save_markdown(&path, "# Hi\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Hi\n");
    }
}
