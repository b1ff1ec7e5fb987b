use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MaskPackerError;
use crate::resample::ResampleKernel;

/// Output image encodings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless.
    #[default]
    Png,
    /// Quality 100, no alpha channel.
    Jpg,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = MaskPackerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => Err(MaskPackerError::InvalidFormat(s.to_string())),
        }
    }
}

/// When to append the two-digit page index to output names.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageIndexPolicy {
    /// Only for pages whose base name is shared with another page.
    #[default]
    Auto,
    /// On every page (`<base>_<suffix>_<NN>.<ext>`).
    Always,
}

impl FromStr for PageIndexPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            _ => Err(()),
        }
    }
}

/// Settings for composing and saving mask pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposeConfig {
    /// Encoding of the written pages.
    #[serde(default)]
    pub format: OutputFormat,
    /// Appended to each page's base name: `<base>_<suffix>.<ext>`.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Keep the canvas alpha channel. When false every pixel is forced opaque.
    #[serde(default)]
    pub keep_alpha: bool,
    /// Kernel used when a sprite is rotated.
    #[serde(default)]
    pub kernel: ResampleKernel,
    #[serde(default)]
    pub page_index: PageIndexPolicy,
    /// Run page jobs on the rayon pool (requires the `parallel` feature).
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            suffix: default_suffix(),
            keep_alpha: false,
            kernel: ResampleKernel::default(),
            page_index: PageIndexPolicy::default(),
            parallel: default_parallel(),
        }
    }
}

fn default_suffix() -> String {
    "masks".into()
}

fn default_parallel() -> bool {
    true
}

impl ComposeConfig {
    /// Validates the configuration.
    ///
    /// The suffix becomes part of a file name, so it must be non-empty and free of path
    /// separators.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.suffix.is_empty() {
            return Err(MaskPackerError::InvalidConfig(
                "suffix must not be empty".into(),
            ));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(MaskPackerError::InvalidConfig(format!(
                "suffix {:?} must not contain path separators",
                self.suffix
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `ComposeConfig`.
    pub fn builder() -> ComposeConfigBuilder {
        ComposeConfigBuilder::new()
    }
}

/// Builder for `ComposeConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct ComposeConfigBuilder {
    cfg: ComposeConfig,
}

impl ComposeConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: ComposeConfig::default(),
        }
    }
    pub fn format(mut self, v: OutputFormat) -> Self {
        self.cfg.format = v;
        self
    }
    pub fn suffix(mut self, v: impl Into<String>) -> Self {
        self.cfg.suffix = v.into();
        self
    }
    pub fn keep_alpha(mut self, v: bool) -> Self {
        self.cfg.keep_alpha = v;
        self
    }
    pub fn kernel(mut self, v: ResampleKernel) -> Self {
        self.cfg.kernel = v;
        self
    }
    pub fn page_index(mut self, v: PageIndexPolicy) -> Self {
        self.cfg.page_index = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> ComposeConfig {
        self.cfg
    }
}
