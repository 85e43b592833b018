//! # sites 命令实现
//!
//! 打印结构摘要和唯一位点表格，用于选择 `--site`；可导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/sites.rs` 定义的参数
//! - 使用 `parsers/`, `xas/sites.rs`, `utils/output.rs`

use crate::cli::sites::SitesArgs;
use crate::elements::element_name;
use crate::error::{Cif4xasError, Result};
use crate::parsers;
use crate::symmetry::spacegroups::crystal_system;
use crate::utils::output;
use crate::xas::{SiteRow, XasStructure};

use std::path::Path;

pub fn execute(args: SitesArgs) -> Result<()> {
    let structure = parsers::parse_structure_file(&args.input, args.frame)?;
    let absorber = match args.absorber {
        Some(a) => a,
        None => structure
            .elements()
            .into_iter()
            .next()
            .ok_or_else(|| Cif4xasError::InvalidArgument("structure has no atoms".to_string()))?,
    };
    let xs = XasStructure::new(structure, &absorber)?;

    output::print_header(&format!("Sites of {}", xs.structure.name));
    output::print_kv("Formula", &xs.formula());
    output::print_kv("Space group", &space_group_summary(&xs));
    output::print_kv("Elements", &xs.elements().join(", "));
    output::print_kv(
        "Absorber",
        &format!(
            "{} ({}), sites {:?}",
            xs.absorber,
            element_name(xs.absorber_z).unwrap_or("?"),
            xs.absorber_sites
        ),
    );
    println!();
    println!("{}", xs.show_sites());

    if let Some(path) = &args.csv {
        write_csv(path, &xs.site_rows())?;
        output::print_success(&format!("Site table written to {}", path.display()));
    }
    Ok(())
}

/// `Fm-3m (No. 225, cubic)`；无编号时只有符号
fn space_group_summary(xs: &XasStructure) -> String {
    match xs.space_group_number {
        Some(number) => format!(
            "{} (No. {}, {})",
            xs.space_group,
            number,
            crystal_system(number)
        ),
        None => xs.space_group.clone(),
    }
}

pub fn write_csv(path: &Path, rows: &[SiteRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| Cif4xasError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_data::{NACL_CIF, WATER_XYZ};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_sites_csv_export() {
        let dir = tempdir().unwrap();
        let cif = dir.path().join("NaCl.cif");
        fs::write(&cif, NACL_CIF).unwrap();
        let csv_path = dir.path().join("sites.csv");

        execute(SitesArgs {
            input: cif,
            absorber: None,
            frame: 0,
            csv: Some(csv_path.clone()),
        })
        .unwrap();

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().last(), Some("multiplicity"));
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "1 (abs)");
        assert_eq!(&records[1][0], "2");
        assert_eq!(&records[0][7], "4");
    }

    #[test]
    fn test_space_group_summary() {
        let structure = parsers::cif::parse_cif_content(NACL_CIF, "NaCl.cif", 0).unwrap();
        let xs = XasStructure::new(structure, "Na").unwrap();
        assert_eq!(space_group_summary(&xs), "Fm-3m (No. 225, cubic)");

        let water = parsers::xyz::parse_xyz_content(WATER_XYZ, "water.xyz", 0).unwrap();
        let xs = XasStructure::new(water, "O").unwrap();
        assert_eq!(space_group_summary(&xs), "P1 (No. 1, triclinic)");
    }

    #[test]
    fn test_missing_file() {
        let err = execute(SitesArgs {
            input: PathBuf::from("/nonexistent/x.cif"),
            absorber: None,
            frame: 0,
            csv: None,
        })
        .unwrap_err();
        assert!(matches!(err, Cif4xasError::FileNotFound { .. }));
    }
}
