use ledger_report_builder::{LedgerSession, ReportRequest, ScriptView};

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("usage: ledger_report <ledger.csv|ledger.xlsx>");
    let bytes = std::fs::read(&path).expect("ledger file should be readable");

    let mut session = LedgerSession::new();
    let dataset = session
        .load(&bytes, &path)
        .expect("ledger file should normalize");

    println!("Raw data preview:");
    for record in dataset.preview(5) {
        println!(
            " - {} {:?} {} dr={} cr={} bal={} script={:?}",
            record.client_id,
            record.created_at,
            record.ledger_type,
            record.debit,
            record.credit,
            record.balance,
            record.script
        );
    }

    let options = dataset.filter_options();
    let request = ReportRequest {
        filters: options.default_filters(),
        script_view: ScriptView::All,
    };

    let bundle = session
        .run(&request)
        .expect("reports should generate")
        .expect("a dataset was loaded");

    for table in bundle.tables() {
        println!("\n### {}", table.title());
        print!("{}", table.to_csv().expect("table should render"));
    }

    let workbook = bundle.to_xlsx().expect("workbook should export");
    std::fs::write("ledger_report.xlsx", workbook).expect("workbook should be written");
    println!("\nWrote ledger_report.xlsx");
}
