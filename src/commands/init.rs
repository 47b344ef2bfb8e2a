//! `flotilla init` - scaffold a new project
//!
//! Creates an environment descriptor and two sample applications: one
//! that builds an image on the fleet and one that deploys a preconfigured
//! image.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use flotilla::environment::{APPLICATIONS_DIR, APPLICATION_FILE, ENVIRONMENT_FILE};

use crate::ui;

const ENVIRONMENT_TEMPLATE: &str = r#"registry:
  host: registry.local
nodes:
  - name: first-node
    host: first-node.local
    labels:
      - sensor
      - gateway
"#;

const BUILD_APP_MANIFEST: &str = r#"deploysTo:
  - ".sensor"
build:
  buildsOn: ".sensor"
  args:
    profile: release
run:
  ports:
    8080: 8080
  volumes:
    /var/lib/with-build: /data
"#;

const BUILD_APP_DOCKERFILE: &str = r#"FROM alpine
CMD ["echo", "hello"]
"#;

const IMAGE_APP_MANIFEST: &str = r##"deploysTo:
  - "#first-node"
image: alpine:3.20
"##;

pub fn run(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            bail!("project path exists but is not a directory: {}", dir.display())
        }
        Ok(_) => {}
        Err(_) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
    }

    let environment = dir.join(ENVIRONMENT_FILE);
    if environment.exists() {
        bail!("{} already exists", environment.display());
    }
    fs::write(&environment, ENVIRONMENT_TEMPLATE)?;
    ui::print_created(&environment);

    write_application(dir, "with-build", ManifestKind::Build)?;
    write_application(dir, "without-build", ManifestKind::Image)?;

    ui::info("project ready - edit environment.yaml, then run 'flotilla vet'");
    Ok(())
}

enum ManifestKind {
    Build,
    Image,
}

fn write_application(dir: &Path, name: &str, kind: ManifestKind) -> Result<()> {
    let app_dir = dir.join(APPLICATIONS_DIR).join(name);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("creating {}", app_dir.display()))?;

    let manifest = app_dir.join(APPLICATION_FILE);
    match kind {
        ManifestKind::Build => {
            fs::write(&manifest, BUILD_APP_MANIFEST)?;
            fs::write(app_dir.join("Dockerfile"), BUILD_APP_DOCKERFILE)?;
        }
        ManifestKind::Image => {
            fs::write(&manifest, IMAGE_APP_MANIFEST)?;
        }
    }
    ui::print_created(&manifest);
    Ok(())
}
