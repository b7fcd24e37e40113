use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    config::{CloudConfig, Language},
    error::{Result, WcloudError},
    morph::{MorphAnalyzer, PosPolicy},
    wakati::tokenize_file,
    CloudRenderer,
};

const WAKATI_DIR: &str = "wakati";
const IMAGE_DIR: &str = "images";
const IMAGE_EXTENSION: &str = "png";

/// Morphological analysis settings for the Japanese path.
pub struct Wakati<'a> {
    pub analyzer: &'a dyn MorphAnalyzer,
    pub policy: &'a PosPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudFiles {
    /// The text handed to the renderer; the input itself when tokenization was skipped.
    pub text: PathBuf,
    pub image: PathBuf,
}

/// The directory holding `wakati/`, `images/` and the font.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// Rooted next to the running executable.
    pub fn from_current_exe() -> Result<Self> {
        let exe = env::current_exe().map_err(|err| WcloudError::io("current executable", err))?;
        let root = exe.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Workspace::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn wakati_dir(&self) -> PathBuf {
        self.root.join(WAKATI_DIR)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join(IMAGE_DIR)
    }

    /// `wakati/<input file name>`
    pub fn wakati_path(&self, input: &Path) -> PathBuf {
        let name = input.file_name().unwrap_or(input.as_os_str());
        self.wakati_dir().join(name)
    }

    /// `images/<input stem>.png`
    pub fn image_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        self.image_dir()
            .join(format!("{}.{IMAGE_EXTENSION}", stem.to_string_lossy()))
    }

    /// Preset for `language`, with a relative font path found in the workspace when present.
    pub fn cloud_config(&self, language: Language) -> CloudConfig {
        let config = CloudConfig::for_language(language);
        if config.font_path.is_relative() {
            let local = self.root.join(&config.font_path);
            if local.exists() {
                return config.with_font_path(local);
            }
        }
        config
    }

    pub fn draw_cloud(
        &self,
        input: &Path,
        wakati: Option<&Wakati>,
        renderer: &dyn CloudRenderer,
    ) -> Result<CloudFiles> {
        let text = match wakati {
            Some(wakati) => {
                let dir = self.wakati_dir();
                fs::create_dir_all(&dir).map_err(|err| WcloudError::io(&dir, err))?;
                let output = self.wakati_path(input);
                tokenize_file(input, Some(output.as_path()), wakati.analyzer, wakati.policy)?
            }
            None => input.to_path_buf(),
        };

        let dir = self.image_dir();
        fs::create_dir_all(&dir).map_err(|err| WcloudError::io(&dir, err))?;
        let image = render_cloud(&text, &self.image_path(input), renderer)?;

        Ok(CloudFiles { text, image })
    }
}

/// Renders the text in `text_path` and saves it as `image_path`.
pub fn render_cloud(
    text_path: &Path,
    image_path: &Path,
    renderer: &dyn CloudRenderer,
) -> Result<PathBuf> {
    let text = fs::read_to_string(text_path).map_err(|err| WcloudError::io(text_path, err))?;
    let image = renderer.render(&text)?;
    image.save_with_format(image_path, image::ImageFormat::Png)?;

    info!(image = %image_path.display(), "saved word cloud");
    Ok(image_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_follow_input_name() {
        let workspace = Workspace::new("/opt/cloud");
        let input = Path::new("notes/diary.txt");
        assert_eq!(
            workspace.wakati_path(input),
            Path::new("/opt/cloud/wakati/diary.txt")
        );
        assert_eq!(
            workspace.image_path(input),
            Path::new("/opt/cloud/images/diary.png")
        );
    }

    #[test]
    fn image_name_replaces_only_last_extension() {
        let workspace = Workspace::new("root");
        assert_eq!(
            workspace.image_path(Path::new("a.b.txt")),
            Path::new("root/images/a.b.png")
        );
    }

    #[test]
    fn font_found_in_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let config = workspace.cloud_config(Language::Japanese);
        assert_eq!(config.font_path, Path::new(crate::config::FONT_FILE));

        fs::write(dir.path().join(crate::config::FONT_FILE), b"").unwrap();
        let config = workspace.cloud_config(Language::Japanese);
        assert_eq!(config.font_path, dir.path().join(crate::config::FONT_FILE));
    }
}
