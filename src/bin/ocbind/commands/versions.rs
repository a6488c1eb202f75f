//! `ocbind versions` command

use anyhow::Result;

use super::Session;

pub fn execute(session: &Session) -> Result<i32> {
    let config = session.config()?;
    let settings = config.generator_settings();

    let Some(versions) = config.generator_versions() else {
        eprintln!(
            "no generator version configured\n\
             help: Set `generator.version` in {}",
            session.ctx.project_config_path().display()
        );
        return Ok(crate::EXIT_CONFIG);
    };

    println!("{}:{} (active)", settings.image, versions.active());
    for (i, version) in versions.alternatives().iter().enumerate() {
        println!("{}:{} (--rollback {})", settings.image, version, i + 1);
    }

    Ok(0)
}
