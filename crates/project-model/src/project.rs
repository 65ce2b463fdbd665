//! Project aggregate and on-disk layout.
//!
//! A project is a named, ordered list of slides plus the sequence format
//! they are assembled in. On disk it is a directory holding `slides.json`
//! and the generated assets:
//!
//! ```text
//! <workspace>/config.json          {"nombre_proyecto": "<name>"}
//! <workspace>/<name>/slides.json
//! <workspace>/<name>/IMGS/
//! <workspace>/<name>/VOICE/
//! <workspace>/<name>/SUBS/sub_0001.png
//! <workspace>/<name>/<name>.xml
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use slidereel_common::error::SlideReelError;

use crate::asset::resolve_path;
use crate::settings::SequenceSettings;
use crate::slide::{parse_slide_records, validate_slides, Slide};

/// Name of the workspace descriptor file.
pub const WORKSPACE_CONFIG_FILE: &str = "config.json";

/// Name of the slide list inside a project directory.
pub const SLIDES_FILE: &str = "slides.json";

/// Extension of the generated timeline document.
pub const OUTPUT_EXTENSION: &str = "xml";

/// The aggregate root handed to the timeline engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name. Also names the output document.
    pub name: String,

    /// Sequence format.
    pub settings: SequenceSettings,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Project {
    pub fn new(name: impl Into<String>, settings: SequenceSettings, slides: Vec<Slide>) -> Self {
        Self {
            name: name.into(),
            settings,
            slides,
        }
    }

    /// Sum of all slide durations, in frames.
    pub fn total_frames(&self) -> u64 {
        self.slides
            .iter()
            .map(|slide| slide.duration_frames as u64)
            .sum()
    }

    /// Total duration in seconds at the sequence timebase.
    pub fn duration_secs(&self) -> f64 {
        self.total_frames() as f64 / self.settings.fps as f64
    }
}

/// Workspace descriptor (`config.json`) written by the chunking step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Name of the active project directory inside the workspace.
    #[serde(rename = "nombre_proyecto", alias = "project_name", default)]
    pub project_name: Option<String>,
}

/// Well-known paths inside a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub slides_file: PathBuf,
    pub images_dir: PathBuf,
    pub voice_dir: PathBuf,
    pub subs_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            slides_file: root.join(SLIDES_FILE),
            images_dir: root.join("IMGS"),
            voice_dir: root.join("VOICE"),
            subs_dir: root.join("SUBS"),
            root,
        }
    }

    /// Create the asset directories.
    pub fn create_dirs(&self) -> Result<(), ProjectError> {
        for dir in [&self.root, &self.images_dir, &self.voice_dir, &self.subs_dir] {
            std::fs::create_dir_all(dir).map_err(|e| ProjectError::IoError {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Default location of the generated document for `project_name`.
    pub fn output_file(&self, project_name: &str) -> PathBuf {
        self.root.join(format!("{project_name}.{OUTPUT_EXTENSION}"))
    }
}

/// A project loaded from disk together with its paths.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem layout of the project.
    pub paths: ProjectPaths,

    /// Validated project.
    pub project: Project,
}

impl LoadedProject {
    /// Open either a workspace (has `config.json`) or a project directory.
    pub fn open(path: impl AsRef<Path>, settings: SequenceSettings) -> Result<Self, ProjectError> {
        let path = resolve_dir(path.as_ref())?;
        if path.join(WORKSPACE_CONFIG_FILE).is_file() {
            Self::from_workspace(&path, settings)
        } else {
            Self::from_project_dir(&path, settings)
        }
    }

    /// Load the project named by a workspace's `config.json`.
    ///
    /// `slides.json` is looked up in the project directory first and then
    /// in the workspace root.
    pub fn from_workspace(
        workspace: impl AsRef<Path>,
        settings: SequenceSettings,
    ) -> Result<Self, ProjectError> {
        let workspace = resolve_dir(workspace.as_ref())?;
        let config_path = workspace.join(WORKSPACE_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(ProjectError::MissingConfig {
                message: format!("no {WORKSPACE_CONFIG_FILE} in {}", workspace.display()),
            });
        }

        let config: WorkspaceConfig = read_json(&config_path)?;
        let name = config
            .project_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProjectError::MissingConfig {
                message: format!("{} must set 'nombre_proyecto'", config_path.display()),
            })?;

        let mut paths = ProjectPaths::new(resolve_path(&workspace.join(&name)));
        if !paths.slides_file.is_file() {
            let fallback = workspace.join(SLIDES_FILE);
            if fallback.is_file() {
                tracing::debug!(path = %fallback.display(), "Using workspace-level slide list");
                paths.slides_file = fallback;
            }
        }

        Self::load(paths, name, settings)
    }

    /// Load a project directory; its name is the directory name.
    pub fn from_project_dir(
        dir: impl AsRef<Path>,
        settings: SequenceSettings,
    ) -> Result<Self, ProjectError> {
        let dir = resolve_dir(dir.as_ref())?;
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| ProjectError::MissingConfig {
                message: format!("cannot derive a project name from {}", dir.display()),
            })?;
        Self::load(ProjectPaths::new(dir), name, settings)
    }

    fn load(
        paths: ProjectPaths,
        name: String,
        settings: SequenceSettings,
    ) -> Result<Self, ProjectError> {
        settings.validate()?;
        let content =
            std::fs::read_to_string(&paths.slides_file).map_err(|e| ProjectError::IoError {
                path: paths.slides_file.clone(),
                source: e,
            })?;
        let records = parse_slide_records(&content).map_err(|e| ProjectError::ParseError {
            path: paths.slides_file.clone(),
            source: e,
        })?;
        let slides = validate_slides(&records, &settings)?;

        tracing::info!(
            project = %name,
            slides = slides.len(),
            root = %paths.root.display(),
            "Loaded project"
        );

        Ok(Self {
            paths,
            project: Project::new(name, settings, slides),
        })
    }

    /// Create an empty project inside `workspace` and point the workspace
    /// descriptor at it.
    pub fn create(workspace: impl AsRef<Path>, name: &str) -> Result<ProjectPaths, ProjectError> {
        let workspace = workspace.as_ref();
        std::fs::create_dir_all(workspace).map_err(|e| ProjectError::IoError {
            path: workspace.to_path_buf(),
            source: e,
        })?;
        let workspace = resolve_dir(workspace)?;
        let paths = ProjectPaths::new(workspace.join(name));
        paths.create_dirs()?;

        if !paths.slides_file.exists() {
            write_file(&paths.slides_file, "[]\n")?;
        }

        let config = WorkspaceConfig {
            project_name: Some(name.to_string()),
        };
        let config_path = workspace.join(WORKSPACE_CONFIG_FILE);
        let json =
            serde_json::to_string_pretty(&config).map_err(|e| ProjectError::ParseError {
                path: config_path.clone(),
                source: e,
            })?;
        write_file(&config_path, &json)?;

        Ok(paths)
    }

    /// Default output document path.
    pub fn output_path(&self) -> PathBuf {
        self.paths.output_file(&self.project.name)
    }

    /// Images referenced by slides that are not present on disk.
    pub fn missing_images(&self) -> Vec<(u32, PathBuf)> {
        self.project
            .slides
            .iter()
            .map(|slide| (slide.ordinal, self.paths.images_dir.join(&slide.image)))
            .filter(|(_, path)| !path.is_file())
            .collect()
    }
}

/// Canonical form of an existing directory.
fn resolve_dir(path: &Path) -> Result<PathBuf, ProjectError> {
    std::fs::canonicalize(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ProjectError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ProjectError> {
    std::fs::write(path, content).map_err(|e| ProjectError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when loading projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing configuration: {message}")]
    MissingConfig { message: String },

    #[error("Invalid slide {ordinal}: {reason}")]
    InvalidSlide { ordinal: u32, reason: String },

    #[error("Slide list is empty")]
    EmptySlides,

    #[error("Invalid sequence settings: {message}")]
    InvalidSettings { message: String },
}

impl From<ProjectError> for SlideReelError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::InvalidSlide { ordinal, reason } => {
                SlideReelError::InvalidSlide { ordinal, reason }
            }
            ProjectError::EmptySlides => SlideReelError::EmptyTimeline,
            ProjectError::MissingConfig { message } | ProjectError::InvalidSettings { message } => {
                SlideReelError::Config { message }
            }
            ProjectError::IoError { path, source }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                SlideReelError::FileNotFound { path }
            }
            other => SlideReelError::project(other.to_string()),
        }
    }
}
