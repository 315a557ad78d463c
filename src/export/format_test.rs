use super::*;

#[test]
fn test_parse_export_format() {
    assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    assert_eq!("Markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
    assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
    assert_eq!(" text ".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
    assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);

    let err = "screenshot".parse::<ExportFormat>().unwrap_err();
    assert_eq!(err.to_string(), "unknown export format: screenshot");
}

#[test]
fn test_export_format_display_round_trips() {
    for format in [
        ExportFormat::Json,
        ExportFormat::Markdown,
        ExportFormat::Text,
        ExportFormat::Csv,
    ] {
        assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
    }
    assert_eq!(ExportFormat::Markdown.extension(), "md");
    assert_eq!(ExportFormat::Text.extension(), "txt");
}
