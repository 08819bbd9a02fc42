use rankbee_validator::{ValidationReport, validate_manifest_file, validate_output};
use std::path::Path;

pub async fn run(manifest: &Path, dist: Option<&Path>) -> anyhow::Result<()> {
    println!("Validating route manifest: {}", manifest.display());

    let (mut report, routes) = validate_manifest_file(manifest);

    if let Some(dist) = dist {
        println!("Validating prerendered output: {}", dist.display());
        report.merge(validate_output(dist, &routes));
    }

    print_report(&report);

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!("\n✓ Validation passed");
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for error in &report.errors {
        println!("  ✗ {}", error);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    for info in &report.info {
        println!("  {}", info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_valid_manifest_passes() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("routes.json");
        fs::write(&manifest, r#"["/", "/about"]"#).unwrap();

        assert!(run(&manifest, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_output_fails() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("routes.json");
        fs::write(&manifest, r#"["/"]"#).unwrap();

        let result = run(&manifest, Some(&temp.path().join("dist"))).await;
        assert!(result.unwrap_err().to_string().contains("1 error"));
    }
}
