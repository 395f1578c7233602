use std::io::{Cursor, Read, Write};

use report_service::{build_report, generate_report, PipelineError, ReportSettings};
use time::macros::{date, time};
use zip::{write::SimpleFileOptions, ZipWriter};

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(body.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

const DAY_ONE: &str = "\
1,2024/01/01,00:00:00,P1,OK,100
2,2024/01/01,00:15:00,P1,OK,102
3,2024/01/01,00:30:00,P1,OK,105
";

const DAY_TWO: &str = "\
1,2024/01/02,00:00:00,P1,OK,105
2,2024/01/02,00:15:00,P1,OK,108
";

#[test]
fn two_days_of_comma_logs() {
    let archive = zip_of(&[("01.csv", DAY_ONE), ("02.csv", DAY_TWO)]);
    let report = build_report(&archive, &ReportSettings::new(100.0)).expect("report");

    assert_eq!(report.days.len(), 2);
    let (d1, d2) = (&report.days[0], &report.days[1]);

    assert_eq!(d1.date, date!(2024-01-01));
    assert_eq!(d1.last_reading_time, time!(00:30:00));
    assert_eq!(d1.pump_event_count, 2);
    assert_eq!(d1.daily_consumption, 0.0);

    assert_eq!(d2.pump_event_count, 1);
    assert_eq!(d2.daily_consumption, 3.0);
    assert_eq!(d2.percent_of_allowance, 3.0);

    assert_eq!(report.total.daily_consumption, 3.0);
    assert_eq!(report.total.allowance, 200.0);
    assert_eq!(report.total.percent_of_allowance, 1.5);
    assert_eq!(report.total.pumping_duration_hhmm(), "00:45");
}

#[test]
fn file_order_in_archive_does_not_matter() {
    let forward = zip_of(&[("01.csv", DAY_ONE), ("02.csv", DAY_TWO)]);
    let reversed = zip_of(&[("02.csv", DAY_TWO), ("01.csv", DAY_ONE)]);
    let settings = ReportSettings::new(100.0);

    assert_eq!(
        build_report(&forward, &settings).expect("report"),
        build_report(&reversed, &settings).expect("report")
    );
}

#[test]
fn archive_without_csv_files_produces_nothing() {
    let archive = zip_of(&[("leia-me.txt", "sem dados")]);

    assert!(matches!(
        generate_report(&archive, 9600.0),
        Err(PipelineError::NoInputFiles)
    ));
}

#[test]
fn erro_rows_are_dropped_silently() {
    let log = "\
1;2024/03/01;10:00:00;x;50,0
2;2024/03/01;10:15:00;x;ERRO
3;2024/03/01;10:30:00;x;53,5
";
    let archive = zip_of(&[("MARCO.CSV", log)]);
    let report = build_report(&archive, &ReportSettings::new(9600.0)).expect("report");

    assert_eq!(report.days.len(), 1);
    assert_eq!(report.days[0].last_accumulated_flow, 53.5);
    assert_eq!(report.days[0].last_reading_time, time!(10:30:00));
    // 50.0 -> 53.5 is one step once the ERRO row is gone.
    assert_eq!(report.days[0].pump_event_count, 1);
}

#[test]
fn all_rows_unusable_is_terminal() {
    let archive = zip_of(&[("a.csv", ""), ("b.csv", "1,2024/01/01,00:00:00,a,b,ERRO\n")]);

    assert!(matches!(
        generate_report(&archive, 9600.0),
        Err(PipelineError::NoValidRows)
    ));
}

#[test]
fn unparseable_timestamps_everywhere_is_terminal() {
    let archive = zip_of(&[("a.csv", "1,01-01-2024,00h00,a,b,10\n")]);

    assert!(matches!(
        generate_report(&archive, 9600.0),
        Err(PipelineError::NoValidTimestamps)
    ));
}

#[test]
fn negative_allowance_is_refused() {
    let archive = zip_of(&[("01.csv", DAY_ONE)]);

    assert!(matches!(
        generate_report(&archive, -5.0),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn workbook_is_an_xlsx_container() {
    let archive = zip_of(&[("01.csv", DAY_ONE), ("02.csv", DAY_TWO)]);
    let bytes = generate_report(&archive, 9600.0).expect("workbook");

    let workbook = zip::ZipArchive::new(Cursor::new(bytes)).expect("xlsx is a zip");
    let names: Vec<&str> = workbook.file_names().collect();
    assert!(names.contains(&"xl/worksheets/sheet1.xml"));
    assert!(names.iter().any(|n| n.starts_with("xl/charts/chart")));
}

#[test]
fn chart_plots_day_rows_but_not_the_total() {
    let archive = zip_of(&[("01.csv", DAY_ONE), ("02.csv", DAY_TWO)]);
    let bytes = generate_report(&archive, 9600.0).expect("workbook");

    let mut workbook = zip::ZipArchive::new(Cursor::new(bytes)).expect("xlsx is a zip");
    let mut chart_xml = String::new();
    workbook
        .by_name("xl/charts/chart1.xml")
        .expect("chart part")
        .read_to_string(&mut chart_xml)
        .expect("utf-8 chart xml");

    // Two day rows sit on sheet rows 2..=3; TOTAL MENSAL is row 4.
    assert!(chart_xml.contains("Resumo Mensal"));
    assert!(chart_xml.contains("!$A$2:$A$3"));
    assert!(chart_xml.contains("!$D$2:$D$3"));
    assert!(chart_xml.contains("!$G$2:$G$3"));
    for total_cell in ["$A$4", "$D$4", "$G$4"] {
        assert!(!chart_xml.contains(total_cell));
    }
}
