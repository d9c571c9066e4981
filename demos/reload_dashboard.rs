use delivery_reconciler::{write_export_csv, Dashboard, DashboardConfig, Session, SheetClient};
use std::env;
use std::fs::File;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spreadsheet_id =
        env::var("SPREADSHEET_ID").map_err(|_| "Set SPREADSHEET_ID to a public Google Sheet id")?;
    let config = match env::var("DASHBOARD_CONFIG") {
        Ok(path) => DashboardConfig::from_file(path.as_ref())?,
        Err(_) => DashboardConfig::new(spreadsheet_id),
    };

    let client = SheetClient::new(config.clone())?;

    let users = client.fetch_users().await?;
    let mut session = Session::new();
    let user = env::var("DASHBOARD_USER").unwrap_or_default();
    let password = env::var("DASHBOARD_PASSWORD").unwrap_or_default();
    session.login(&users, &user, &password)?;

    let mut dashboard = Dashboard::new(config);
    if let Err(e) = dashboard.reload(&client).await {
        eprintln!("Reload failed: {}", e);
        return Err(e.into());
    }

    let today = chrono::Local::now().date_naive();
    let view = dashboard.view(today);
    println!(
        "{} records in view ({} pages) for {}",
        view.total_items,
        view.page_count,
        session.require_user()?.user
    );

    let totals = dashboard.summary(today);
    println!("{:#?}", totals);

    let file = File::create("dados_filtrados.csv")?;
    write_export_csv(file, &dashboard.filtered(today))?;
    println!("Exported filtered rows to dados_filtrados.csv");

    session.logout();
    Ok(())
}
