use chrono::NaiveDate;
use delivery_reconciler::{
    apply, reconcile_csv, summarize, summarize_by_product, DashboardConfig, PeriodFilter,
    SortConfig, SortDirection, SortKey, ViewFilters,
};

const FORECASTS: &str = "\
Codigo,Produto,Quantidade Prevista,Data de Previsão de Entrega
A1,Widget,100,01/05/2024
A1,Widget,50,15/05/2024
B7,Gadget,30,10/05/2024
C3,Gizmo,0,12/05/2024
";

const DELIVERIES: &str = "\
Codigo,Produto,Quantidade Entregue,Data Referente (Planejada),Data de Entrega Real
A1,Widget,40,01/05/2024,03/05/2024
A1,Widget,30,01/05/2024,06/05/2024
B7,Gadget,45,10/05/2024,10/05/2024
Z9,Widget,5,02/05/2024,02/05/2024
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::new("offline");
    let records = reconcile_csv(FORECASTS, DELIVERIES, &config)?;

    let today = NaiveDate::from_ymd_opt(2024, 5, 20).ok_or("invalid date")?;
    let filters = ViewFilters {
        period: PeriodFilter::CurrentMonth,
        ..Default::default()
    };
    let sort = SortConfig::by(SortKey::DeliveryPercentage, SortDirection::Descending);
    let view = apply(&records, &filters, &sort, 0, config.page_size, today);

    println!("{:<6} {:<8} {:>10} {:>12} {:>10} {:>9}", "Code", "Product", "Forecast", "Date", "Delivered", "Percent");
    for r in &view.page_items {
        println!(
            "{:<6} {:<8} {:>10} {:>12} {:>10} {:>8}%",
            r.code,
            r.product,
            r.quantity_forecast,
            r.forecast_date.as_deref().unwrap_or("N/A"),
            r.quantity_delivered,
            r.percentage_label()
        );
    }
    println!("Page 1 of {}", view.page_count);

    let filtered = delivery_reconciler::filter_records(&records, &filters, today);
    let totals = summarize(&filtered);
    println!(
        "\nForecast: {}  Delivered: {}  Shortfall: {}  Surplus: {}",
        totals.total_forecast, totals.total_delivered, totals.total_shortfall, totals.total_surplus
    );

    println!("\nBy product:");
    for summary in summarize_by_product(&records) {
        println!(
            "  {:<8} forecast {:>6} delivered {:>6} late {:>6}",
            summary.product, summary.total_forecast, summary.total_delivered, summary.total_late
        );
    }

    Ok(())
}
