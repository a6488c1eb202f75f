//! Composition of the generator invocation.
//!
//! Composition is a pure function from settings and parameters to a
//! structured [`ProcessBuilder`]; nothing here touches the filesystem or
//! spawns anything. The rendered command doubles as the reproducibility
//! record of a build, so distinct parameters always render differently.

use std::ffi::OsString;

use crate::core::params::BuildParameters;
use crate::util::process::ProcessBuilder;

pub const DEFAULT_RUNTIME: &str = "docker";
pub const DEFAULT_IMAGE: &str = "donalffons/opencascade.js";
pub const DEFAULT_MOUNT_POINT: &str = "/src";

/// How the generator container is run. Fixed for the lifetime of a launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Container runtime program (`docker`, `podman`, ...)
    pub runtime: String,
    /// Image name without tag
    pub image: String,
    /// Where the working directory appears inside the container
    pub mount_point: String,
    /// Allocate a TTY and keep stdin open (`-it`)
    pub interactive: bool,
    /// Remove the container after it exits (`--rm`)
    pub remove: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            runtime: DEFAULT_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            interactive: false,
            remove: true,
        }
    }
}

impl GeneratorSettings {
    /// Image reference for a given version tag, e.g. `image:tag`.
    pub fn image_ref(&self, params: &BuildParameters) -> String {
        format!("{}:{}", self.image, params.generator_version)
    }
}

/// Compose the invocation for one build.
///
/// `<runtime> run [--rm] [-it] -v <wd>:<mount> <image>:<version> <spec>`
pub fn compose(settings: &GeneratorSettings, params: &BuildParameters) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(&settings.runtime).arg("run");

    if settings.remove {
        cmd = cmd.arg("--rm");
    }
    if settings.interactive {
        cmd = cmd.arg("-it");
    }

    let mut volume = OsString::from(params.working_directory.as_os_str());
    volume.push(":");
    volume.push(&settings.mount_point);

    cmd.arg("-v")
        .arg(volume)
        .arg(settings.image_ref(params))
        .arg(&params.spec_file)
        .cwd(&params.working_directory)
}
