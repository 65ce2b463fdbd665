use std::path::Path;

use slidereel_project_model::asset::FsAssetResolver;
use slidereel_project_model::project::{LoadedProject, ProjectPaths};
use slidereel_project_model::settings::SequenceSettings;
use slidereel_timeline::{ClipBuilder, LayoutEngine, TrackKind};

const SLIDES: &str = r#"[
    {"slide": 1, "chunk": "uno", "texto_pantalla": "Uno", "nombre_imagen": "img_00.jpg", "nombre_audio": "chunk_voice01.mp3", "duracion_frames": 30},
    {"slide": 2, "chunk": "dos", "texto_pantalla": "Dos", "nombre_imagen": "img_01.jpg", "nombre_audio": "chunk_voice02.mp3", "duracion_frames": 45},
    {"slide": 3, "chunk": "tres", "texto_pantalla": "Tres", "nombre_imagen": "img_02.jpg", "nombre_audio": "chunk_voice03.mp3", "duracion_frames": 60}
]"#;

fn touch(path: &Path) {
    std::fs::write(path, b"asset").expect("fixture asset should be writable");
}

fn fixture() -> (tempfile::TempDir, ProjectPaths) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = ProjectPaths::new(dir.path().join("video_demo"));
    paths.create_dirs().expect("project dirs");
    std::fs::write(&paths.slides_file, SLIDES).expect("slides.json");

    for i in 0..3 {
        touch(&paths.images_dir.join(format!("img_{i:02}.jpg")));
    }
    // Narration for slides 1 and 3 only, overlays for slides 2 and 3 only.
    touch(&paths.voice_dir.join("chunk_voice01.mp3"));
    touch(&paths.voice_dir.join("chunk_voice03.mp3"));
    touch(&paths.subs_dir.join("sub_0002.png"));
    touch(&paths.subs_dir.join("sub_0003.png"));

    (dir, paths)
}

#[test]
fn filesystem_presence_drives_optional_tracks() {
    let (_dir, paths) = fixture();
    let loaded = LoadedProject::from_project_dir(&paths.root, SequenceSettings::default())
        .expect("project should load");

    let engine = LayoutEngine::new(FsAssetResolver::new(loaded.paths.clone()).require_images(true));
    let layout = engine.layout(&loaded.project).expect("layout should succeed");

    assert_eq!(layout.total_frames, 135);
    assert_eq!(
        layout.video.iter().map(|p| p.start).collect::<Vec<_>>(),
        vec![0, 30, 75]
    );
    assert_eq!(
        layout.audio.iter().map(|p| p.ordinal).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(
        layout.overlay.iter().map(|p| p.ordinal).collect::<Vec<_>>(),
        vec![2, 3]
    );

    let clips = ClipBuilder::default().build_all(&loaded.project.slides, &layout);
    let audio = clips.track(TrackKind::Audio);
    assert_eq!(audio[1].ids.clip, "aclip-3");
    assert_eq!((audio[1].start, audio[1].end), (75, 135));
    assert!(audio[1].path_url.starts_with("file://localhost/"));
    assert!(audio[1].path_url.ends_with("/video_demo/VOICE/chunk_voice03.mp3"));
}

#[test]
fn layout_is_deterministic_across_runs() {
    let (_dir, paths) = fixture();
    let loaded = LoadedProject::from_project_dir(&paths.root, SequenceSettings::default())
        .expect("project should load");
    let engine = LayoutEngine::new(FsAssetResolver::new(loaded.paths.clone()));
    let builder = ClipBuilder::default();

    let first = engine.layout(&loaded.project).unwrap();
    let second = engine.layout(&loaded.project).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        builder.build_all(&loaded.project.slides, &first),
        builder.build_all(&loaded.project.slides, &second)
    );
}

#[test]
fn strict_images_reject_missing_file() {
    let (_dir, paths) = fixture();
    std::fs::remove_file(paths.images_dir.join("img_01.jpg")).unwrap();
    let loaded = LoadedProject::from_project_dir(&paths.root, SequenceSettings::default())
        .expect("project should load");

    let err = LayoutEngine::new(FsAssetResolver::new(loaded.paths.clone()).require_images(true))
        .layout(&loaded.project)
        .unwrap_err();
    assert!(err.to_string().contains("Invalid slide 2"));
}
