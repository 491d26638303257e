mod column_chart;
mod donut_chart;
mod footer;
mod stats_sheet;
mod status_bar;
mod subscription_list;

pub use column_chart::ColumnChartWidget;
pub use donut_chart::DonutChartWidget;
pub use footer::FooterWidget;
pub use stats_sheet::StatsSheetWidget;
pub use status_bar::StatusBarWidget;
pub use subscription_list::SubscriptionListWidget;
