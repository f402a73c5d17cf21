//! The YAML configuration document.
//!
//! Only the keys the viewer needs are typed. Everything else (model settings,
//! logo placement, ...) is carried along untouched, so a document can be
//! loaded, changed and written back without losing anything.
use crate::results::SliderRange;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

type Extra = IndexMap<String, serde_yaml::Value>;

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    pub window: WindowSection,
    pub slider: SliderSection,
    pub time_steps: usize,
    pub data: DataSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceSection>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WindowSection {
    pub name: String,
    /// `[x, y, width, height]`
    pub size: [i32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SliderSection {
    pub range: [usize; 2],
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DataSection {
    pub output_pth: PathBuf,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InferenceSection {
    pub delay_ms: u64,
}

pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(2);

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the document next to `path` and renames it into place, so a
    /// failed write leaves the previous file intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = self.to_yaml_string()?;
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write = || -> std::io::Result<()> {
            let mut file = tempfile::NamedTempFile::new_in(directory)?;
            // the temp file starts out private, the replaced one may not be
            if let Ok(metadata) = std::fs::metadata(path) {
                file.as_file().set_permissions(metadata.permissions())?;
            }
            file.write_all(yaml.as_bytes())?;
            file.as_file().sync_all()?;
            file.persist(path).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("configuration written to {path:?}");
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        &self.data.output_pth
    }

    pub fn set_data_path(&mut self, path: PathBuf) {
        self.data.output_pth = path;
    }

    pub fn step_delay(&self) -> Duration {
        self.inference
            .as_ref()
            .map(|i| Duration::from_millis(i.delay_ms))
            .unwrap_or(DEFAULT_STEP_DELAY)
    }

    pub fn slider_range(&self) -> SliderRange {
        let [a, b] = self.slider.range;
        SliderRange::new(a, b)
    }
}

#[cfg(test)]
pub(crate) const DEMO: &str = r#"
window:
  name: Aero GUI
  size: [100, 100, 1200, 900]
slider:
  range: [0, 10]
time_steps: 10
model:
  weights: ckpt/model.pth
  device: cpu
data:
  output_pth: /data/demo_output.txt
  comment: first demo
label:
  pic1:
    path: data/pic/icon_64x64.png
    size: [64, 64]
    pos: [10, 10]
"#;

#[test]
fn demo_document_is_understood() {
    let config = Config::from_yaml_str(DEMO).unwrap();
    assert_eq!(config.window.name, "Aero GUI");
    assert_eq!(config.window.size, [100, 100, 1200, 900]);
    assert_eq!(config.time_steps, 10);
    assert_eq!(config.data_path(), Path::new("/data/demo_output.txt"));
    assert_eq!(config.slider_range(), SliderRange::new(0, 10));
    assert_eq!(config.step_delay(), DEFAULT_STEP_DELAY);
    assert_eq!(
        config.extra.keys().collect::<Vec<_>>(),
        vec!["model", "label"]
    );
    assert!(config.data.extra.contains_key("comment"));
}

#[test]
fn delay_can_be_configured() {
    let text = format!("{DEMO}inference:\n  delay_ms: 250\n");
    let config = Config::from_yaml_str(&text).unwrap();
    assert_eq!(config.step_delay(), Duration::from_millis(250));
}

#[test]
fn round_trip_changes_only_the_data_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg_demo.yml");
    std::fs::write(&path, DEMO).unwrap();

    let mut config = Config::load(&path).unwrap();
    config.set_data_path("/elsewhere/step_3.txt".into());
    config.save(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), config);

    let mut before: serde_yaml::Value = serde_yaml::from_str(DEMO).unwrap();
    let after: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_ne!(before, after);
    before["data"]["output_pth"] = "/elsewhere/step_3.txt".into();
    assert_eq!(before, after);
}

#[test]
fn failed_save_keeps_the_old_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg_demo.yml");
    std::fs::write(&path, DEMO).unwrap();
    let config = Config::load(&path).unwrap();
    let missing = dir.path().join("no_such_directory").join("cfg.yml");
    assert!(matches!(
        config.save(&missing),
        Err(Error::ConfigWrite { .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DEMO);
}

#[test]
fn missing_keys_are_reported() {
    assert!(matches!(
        Config::from_yaml_str("window: {name: x}"),
        Err(Error::ConfigFormat(_))
    ));
    assert!(matches!(
        Config::load("/definitely/not/here.yml"),
        Err(Error::ConfigRead { .. })
    ));
}

#[cfg(unix)]
#[test]
fn save_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg_demo.yml");
    std::fs::write(&path, DEMO).unwrap();
    for mode in [0o644, 0o640] {
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        let mut config = Config::load(&path).unwrap();
        config.set_data_path("/elsewhere/step_3.txt".into());
        config.save(&path).unwrap();
        let saved = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(saved, mode);
    }
}
