//! End-to-end tests: survey file in, machine exports out

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use trialplan_core::formats::csv::CsvOptions;
use trialplan_core::formats::{
    FieldBoundaryWriter, FormatWriter, LineSurveyWriter, RouteControlPlan, RouteControlWriter,
};
use trialplan_core::{PlanningSession, SessionOptions, TrialplanError, Warning};

/// Two rows of 2 m x 10 m plots (ids 1-3 and 11-13) 60 m apart, written as
/// `north;east;altitude;id` in projected coordinates
fn write_plot_file(dir: &Path) -> std::path::PathBuf {
    let mut lines = Vec::new();
    for (row_offset, first_id) in [(0.0, 1), (60.0, 11)] {
        for i in 0..3 {
            let id = first_id + i;
            let east = 574_000.0 + row_offset + f64::from(i) * 2.5;
            let north = 6_224_000.0;
            for (de, dn) in [(0.0, 0.0), (2.0, 0.0), (2.0, 10.0), (0.0, 10.0)] {
                lines.push(format!("{:.3};{:.3};42.0;\"{}\"", north + dn, east + de, id));
            }
        }
    }
    // Corners in reverse file order must not matter
    lines.reverse();
    let path = dir.join("plots.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn write_field_file(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("field.csv");
    fs::write(&path, "56.1600,10.1900,40\n56.1600,10.2100,40\n56.1700,10.2100,40\n56.1700,10.1900,40\n")
        .unwrap();
    path
}

#[test]
fn test_plan_from_projected_file() {
    let dir = TempDir::new().unwrap();
    let plots_path = write_plot_file(dir.path());

    let options = CsvOptions::plots().with_zone(Some(32));
    let mut session =
        PlanningSession::import_plots(&plots_path, &options, SessionOptions::default()).unwrap();

    assert_eq!(session.plots().len(), 6);
    assert!(session.rejections().is_empty());
    assert!(session.warnings().is_empty(), "unexpected warnings: {:?}", session.warnings());

    let ids: Vec<&str> = session.plots().iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "11", "12", "13"]);

    session.plan(None).unwrap();
    assert_eq!(session.blocks().len(), 2);
    assert_eq!(session.route().len(), 6);
    assert_eq!(session.block_of("12"), Some(2));
}

#[test]
fn test_missing_zone_is_reported() {
    let dir = TempDir::new().unwrap();
    let plots_path = write_plot_file(dir.path());

    let session =
        PlanningSession::import_plots(&plots_path, &CsvOptions::plots(), SessionOptions::default())
            .unwrap();
    assert!(session
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::ZoneAmbiguity { .. })));
}

#[test]
fn test_exports_are_written() {
    let dir = TempDir::new().unwrap();
    let plots_path = write_plot_file(dir.path());
    let field_path = write_field_file(dir.path());

    let mut session = PlanningSession::import_plots(
        &plots_path,
        &CsvOptions::plots().with_zone(Some(32)),
        SessionOptions::default(),
    )
    .unwrap();
    session.import_field(&field_path, &CsvOptions::field()).unwrap();
    session.plan(Some("11")).unwrap();
    assert_eq!(session.route()[0].id(), "11");

    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let route_path = out.join(RouteControlWriter.default_file_name());
    RouteControlWriter.write(session.route(), &route_path).unwrap();
    let lines_path = out.join(LineSurveyWriter::default().default_file_name());
    LineSurveyWriter::default().write(session.route(), &lines_path).unwrap();
    let field_path = out.join(FieldBoundaryWriter.default_file_name());
    FieldBoundaryWriter.write(session.field().unwrap(), &field_path).unwrap();

    let plan = RouteControlPlan::read(&route_path).unwrap();
    assert_eq!(plan.rows.len(), 6);
    assert_eq!(plan.rows[0].plots[0].id, "11");

    let lines: serde_json::Value = serde_json::from_str(&fs::read_to_string(&lines_path).unwrap()).unwrap();
    assert_eq!(lines["type"], "MultiLineString");
    assert_eq!(lines["coordinates"].as_array().unwrap().len(), 6);

    let field: serde_json::Value = serde_json::from_str(&fs::read_to_string(&field_path).unwrap()).unwrap();
    assert_eq!(field["field"].as_array().unwrap().len(), 4);
}

#[test]
fn test_incomplete_plot_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plots.csv");
    fs::write(
        &path,
        "56.1600;10.1900;0;A\n56.1600;10.1901;0;A\n56.1602;10.1901;0;A\n56.1602;10.1900;0;A\n\
         56.1600;10.1910;0;B\n56.1600;10.1911;0;B\n",
    )
    .unwrap();

    let session =
        PlanningSession::import_plots(&path, &CsvOptions::plots(), SessionOptions::default()).unwrap();
    assert_eq!(session.plots().len(), 1);
    assert_eq!(session.rejections()[0].plot_id, "B");
    assert!(session
        .warnings()
        .iter()
        .any(|w| matches!(w, Warning::LexicalPlotOrder { .. })));
}

#[test]
fn test_unreadable_row_fails_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plots.csv");
    fs::write(&path, "56.16;10.19;0;1\n56.16;ten;0;1\n").unwrap();

    let err = PlanningSession::import_plots(&path, &CsvOptions::plots(), SessionOptions::default())
        .unwrap_err();
    assert!(matches!(err, TrialplanError::Parse { line: 2, .. }));
}
