use std::io::Write;

use approx::assert_relative_eq;
use pkmodel::prelude::*;

const STUDY: &str = r#"{
    "pairs": [
        {
            "model": { "route": "iv", "v_c": 10.0, "cl": 1.0 },
            "protocol": { "schedule": { "kind": "constant", "rate": 5.0 }, "time_span": 5.0 }
        },
        {
            "model": { "route": "sc", "v_c": 10.0, "cl": 1.0, "k_a": 1.0,
                       "peripherals": [{ "volume": 4.0, "clearance": 0.5 }] },
            "protocol": { "initial_dose": 2.0, "time_span": 5.0,
                          "schedule": { "kind": "infusion", "start": 0.0, "duration": 2.0,
                                        "rate": 5.0 } }
        }
    ]
}"#;

#[test]
fn study_file_to_csv() {
    let file = tempfile_path("study_file_to_csv.json");
    std::fs::File::create(&file)
        .and_then(|mut f| f.write_all(STUDY.as_bytes()))
        .unwrap();
    let study = StudyConfig::from_file(&file).unwrap();
    std::fs::remove_file(&file).unwrap();

    let solution = study.into_solution().unwrap();
    assert_eq!(solution.len(), 2);

    let figure = solution.visualise(Layout::SideBySide, 6).unwrap();
    assert_eq!(figure.layout(), Layout::SideBySide);
    assert_eq!(figure.panels().len(), 2);

    let iv = &figure.panels()[0].series[0];
    assert!(iv.label.ends_with("(iv)"));
    assert_eq!(iv.times, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    for (t, q) in iv.points() {
        let expected = 50.0 * (1.0 - (-t / 10.0_f64).exp());
        assert_relative_eq!(q, expected, max_relative = 1e-4, epsilon = 1e-6);
    }

    let sc = &figure.panels()[1].series[0];
    assert!(sc.label.ends_with("(sc)"));
    assert_eq!(sc.values[0], 2.0);

    let mut renderer = CsvRenderer::new(Vec::new());
    renderer.render(&figure).unwrap();
    let output = String::from_utf8(renderer.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "panel,label,time,value");
    assert_eq!(lines.len(), 1 + 2 * 6);
    assert!(lines[1].starts_with("0,"));
    assert!(lines[12].starts_with("1,"));
}

#[test]
fn overlay_puts_every_pair_on_one_panel() {
    let mut study: StudyConfig = STUDY.parse().unwrap();
    study.pairs.push(study.pairs[0].clone());
    let solution = study.into_solution().unwrap();

    let figure = solution.visualise(Layout::Overlay, 3).unwrap();
    assert_eq!(figure.panels().len(), 1);
    assert_eq!(figure.panels()[0].series.len(), 3);
    assert!(solution.visualise(Layout::SideBySide, 3).is_err());
}

#[test]
fn study_round_trips_through_json() {
    let study: StudyConfig = STUDY.parse().unwrap();
    let again: StudyConfig = study.to_json().unwrap().parse().unwrap();
    let a = study.into_solution().unwrap();
    let b = again.into_solution().unwrap();
    assert_eq!(
        a.solve_pair(1, &[0.0, 2.5]).unwrap(),
        b.solve_pair(1, &[0.0, 2.5]).unwrap()
    );
}

#[test]
fn invalid_parameters_in_file() {
    let json = r#"{ "pairs": [ {
        "model": { "route": "iv", "v_c": 0.0 },
        "protocol": { "time_span": 1.0 }
    } ] }"#;
    let err = json
        .parse::<StudyConfig>()
        .unwrap()
        .into_solution()
        .unwrap_err();
    assert!(matches!(err, PkError::Validation(_)));
}

fn tempfile_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pkmodel-{}-{}", std::process::id(), name))
}
