//! Asset resolution.
//!
//! Whether an overlay or narration clip is placed depends on whether the
//! asset exists on disk. That check lives behind [`AssetResolver`] so the
//! layout engine asks once per slide per track and never touches the
//! filesystem itself.

use std::path::{Component, Path, PathBuf};

use crate::project::ProjectPaths;
use crate::slide::Slide;

/// Resolves slide assets to absolute paths.
pub trait AssetResolver {
    /// Path of the slide's image, or `None` if it cannot be resolved.
    fn image(&self, slide: &Slide) -> Option<PathBuf>;

    /// Path of the slide's caption overlay, or `None` if it is not available.
    fn overlay(&self, slide: &Slide) -> Option<PathBuf>;

    /// Path of the slide's narration audio, or `None` if it is not available.
    fn narration(&self, slide: &Slide) -> Option<PathBuf>;
}

impl<R: AssetResolver + ?Sized> AssetResolver for &R {
    fn image(&self, slide: &Slide) -> Option<PathBuf> {
        (**self).image(slide)
    }

    fn overlay(&self, slide: &Slide) -> Option<PathBuf> {
        (**self).overlay(slide)
    }

    fn narration(&self, slide: &Slide) -> Option<PathBuf> {
        (**self).narration(slide)
    }
}

/// Resolver backed by the standard project directory layout.
///
/// Overlays and narration are resolved by existence. Images are resolved
/// by name only unless `require_images` is set, since image content is
/// never inspected.
#[derive(Debug, Clone)]
pub struct FsAssetResolver {
    paths: ProjectPaths,
    require_images: bool,
}

impl FsAssetResolver {
    pub fn new(paths: ProjectPaths) -> Self {
        Self {
            paths,
            require_images: false,
        }
    }

    /// Also require image files to exist on disk.
    pub fn require_images(mut self, require: bool) -> Self {
        self.require_images = require;
        self
    }
}

impl AssetResolver for FsAssetResolver {
    fn image(&self, slide: &Slide) -> Option<PathBuf> {
        let path = resolve_path(&self.paths.images_dir.join(&slide.image));
        if self.require_images && !path.is_file() {
            return None;
        }
        Some(path)
    }

    fn overlay(&self, slide: &Slide) -> Option<PathBuf> {
        existing(self.paths.subs_dir.join(slide.overlay_file_name()))
    }

    fn narration(&self, slide: &Slide) -> Option<PathBuf> {
        let name = slide.audio.as_ref()?;
        existing(self.paths.voice_dir.join(name))
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then(|| resolve_path(&path))
}

/// Absolute path with symlinks, `.` and `..` resolved.
///
/// Existing paths are canonicalized; anything else is normalized lexically,
/// so the result never contains `..` hops.
pub fn resolve_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(ordinal: u32, audio: Option<&str>) -> Slide {
        Slide {
            ordinal,
            narration: String::new(),
            caption: String::new(),
            image: "img_00.jpg".to_string(),
            audio: audio.map(str::to_string),
            duration_frames: 30,
        }
    }

    fn project_dir() -> (tempfile::TempDir, ProjectPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ProjectPaths::new(std::fs::canonicalize(dir.path()).unwrap());
        paths.create_dirs().unwrap();
        (dir, paths)
    }

    #[test]
    fn test_overlay_resolved_only_when_present() {
        let (_dir, paths) = project_dir();
        std::fs::write(paths.subs_dir.join("sub_0002.png"), b"png").unwrap();
        let resolver = FsAssetResolver::new(paths.clone());

        assert_eq!(resolver.overlay(&slide(1, None)), None);
        assert_eq!(
            resolver.overlay(&slide(2, None)),
            Some(paths.subs_dir.join("sub_0002.png"))
        );
    }

    #[test]
    fn test_narration_requires_name_and_file() {
        let (_dir, paths) = project_dir();
        std::fs::write(paths.voice_dir.join("chunk_voice01.mp3"), b"mp3").unwrap();
        let resolver = FsAssetResolver::new(paths);

        assert!(resolver.narration(&slide(1, None)).is_none());
        assert!(resolver.narration(&slide(1, Some("missing.mp3"))).is_none());
        assert!(resolver
            .narration(&slide(1, Some("chunk_voice01.mp3")))
            .is_some());
    }

    #[test]
    fn test_lexical_normalization_drops_dot_segments() {
        assert_eq!(
            normalize_lexically(Path::new("/ws/sibling/../demo/./IMGS/img.jpg")),
            PathBuf::from("/ws/demo/IMGS/img.jpg")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_image_name_with_parent_hop_is_resolved() {
        let (dir, paths) = project_dir();
        std::fs::create_dir(dir.path().join("shared")).unwrap();
        std::fs::write(dir.path().join("shared").join("cover.jpg"), b"jpg").unwrap();

        let mut s = slide(1, None);
        s.image = "../shared/cover.jpg".to_string();
        let resolved = FsAssetResolver::new(paths).image(&s).unwrap();

        assert!(!resolved.components().any(|c| c == Component::ParentDir));
        assert_eq!(
            resolved,
            std::fs::canonicalize(dir.path().join("shared").join("cover.jpg")).unwrap()
        );
    }

    #[test]
    fn test_image_resolution_is_lenient_by_default() {
        let (_dir, paths) = project_dir();
        let lenient = FsAssetResolver::new(paths.clone());
        let strict = FsAssetResolver::new(paths.clone()).require_images(true);

        assert_eq!(
            lenient.image(&slide(1, None)),
            Some(paths.images_dir.join("img_00.jpg"))
        );
        assert_eq!(strict.image(&slide(1, None)), None);

        std::fs::write(paths.images_dir.join("img_00.jpg"), b"jpg").unwrap();
        assert!(strict.image(&slide(1, None)).is_some());
    }
}
