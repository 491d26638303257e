use std::sync::Arc;

use ratatui::layout::Rect;
use subtrack_core::motion::{
    Clock, CoverageTweener, KeyedTweener, PointerEvent, PointerKind, RowAction, RowCommand,
    SheetController, SwipeList, SwipeOutcome, SwipeRow, SystemClock,
};
use subtrack_core::stats::{
    chart_target, weighted_items, Category, CategoryFilter, CategoryStats, ChartItem, Period,
    RequestGeneration, StatsQuery, StatsSnapshot, StatsSummary, SubscriptionRow, Ticket,
};
use subtrack_core::AppConfig;
use tracing::debug;

use crate::theme::Theme;

/// Tab shown inside the stats sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetTab {
    /// Bars per subscription
    All,
    /// Donut and bars per category
    ByCategory,
}

/// Application mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Normal browsing mode
    Normal,
    /// Delete confirmation for a subscription id
    DeleteConfirm(i64),
    /// Disable or enable confirmation for a subscription id
    DisableConfirm(i64),
    /// Picking the category a subscription moves to; `choice` indexes
    /// [`App::move_choices`]
    MovePick { row_id: i64, choice: usize },
}

/// Backend change confirmed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMutation {
    Delete { id: i64, name: String },
    SetDisabled { id: i64, name: String, disabled: bool },
    SetCategory { id: i64, name: String, category_id: Option<i64> },
}

/// Application state
pub struct App<C: Clock = SystemClock> {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// Subscriptions, active first
    pub subscriptions: Vec<SubscriptionRow>,
    /// Currently selected row index
    pub selected: usize,
    /// First row index drawn in the list
    pub list_offset: usize,
    /// Last rendered list area, for mouse hit testing
    pub list_area: Rect,
    /// Per-row swipe state
    pub swipe: SwipeList,
    pub sheet: SheetController<C>,
    /// Bars per subscription
    pub bars: KeyedTweener<C>,
    /// Bars per category
    pub category_bars: KeyedTweener<C>,
    pub donut: CoverageTweener<C>,
    pub summary: StatsSummary,
    pub by_category: CategoryStats,
    pub period: Period,
    /// Filters both the list and the summary stats
    pub category: CategoryFilter,
    /// Known categories, by name
    pub categories: Vec<Category>,
    pub tab: SheetTab,
    /// Guards the subscription list against out-of-order responses
    pub list_generation: RequestGeneration,
    pub mode: Mode,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    /// A stats load is in flight
    pub is_loading: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Self {
        Self::with_clock(config, theme, SystemClock::new())
    }
}

impl<C: Clock + Clone> App<C> {
    /// Build with an explicit clock shared by every animated subject
    pub fn with_clock(config: Arc<AppConfig>, theme: Theme, clock: C) -> Self {
        let motion = &config.motion;
        Self {
            swipe: SwipeList::new(config.swipe.clone()),
            sheet: SheetController::from_config(clock.clone(), motion),
            bars: KeyedTweener::from_config(clock.clone(), motion),
            category_bars: KeyedTweener::from_config(clock.clone(), motion),
            donut: CoverageTweener::from_config(clock, motion),
            config,
            theme,
            subscriptions: Vec::new(),
            selected: 0,
            list_offset: 0,
            list_area: Rect::default(),
            summary: StatsSummary::default(),
            by_category: CategoryStats::default(),
            period: Period::default(),
            category: CategoryFilter::default(),
            categories: Vec::new(),
            tab: SheetTab::All,
            list_generation: RequestGeneration::new(),
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            is_loading: false,
        }
    }
}

impl<C: Clock> App<C> {
    /// Parameters for the next stats load
    pub fn query(&self) -> StatsQuery {
        StatsQuery {
            period: self.period,
            category: self.category,
        }
    }

    /// Feed a completed stats load into the charts
    pub fn apply_stats(&mut self, snapshot: StatsSnapshot) {
        if snapshot.query != self.query() {
            debug!(query = ?snapshot.query, "Ignoring stats for an outdated query");
            return;
        }
        self.summary = snapshot.summary;
        self.by_category = snapshot.by_category;
        self.is_loading = false;

        self.bars.set_target(chart_target(&self.summary.chart_items()));
        let categories = self.by_category.chart_items();
        self.category_bars.set_target(chart_target(&categories));
        self.donut.set_items(&weighted_items(&categories));
        self.sheet.on_summary_changed();
    }

    /// Replace the list; returns false for a superseded response
    pub fn apply_subscriptions(&mut self, ticket: Ticket, rows: Vec<SubscriptionRow>) -> bool {
        if !self.list_generation.is_current(&ticket) {
            debug!(ticket = ticket.value(), "Discarding stale subscription list");
            return false;
        }
        self.swipe.sync(rows.iter().map(SubscriptionRow::identity));
        self.subscriptions = rows;
        self.selected = self.selected.min(self.subscriptions.len().saturating_sub(1));
        true
    }

    pub fn summary_items(&self) -> Vec<ChartItem> {
        self.summary.chart_items()
    }

    pub fn category_items(&self) -> Vec<ChartItem> {
        self.by_category.chart_items()
    }

    /// Advance every animated subject by one frame
    ///
    /// Returns whether anything on screen changed.
    pub fn tick(&mut self) -> bool {
        let bars = self.bars.tick();
        let category_bars = self.category_bars.tick();
        let donut = self.donut.tick();
        let sheet = self.sheet.tick();
        bars || category_bars || donut || sheet
    }

    /// Whether the loop should poll at the animation frame rate
    pub fn is_animating(&self) -> bool {
        self.bars.is_animating()
            || self.category_bars.is_animating()
            || self.donut.is_animating()
            || self.sheet.is_animating()
            || self.swipe.is_dragging()
    }

    pub fn selected_row(&self) -> Option<&SubscriptionRow> {
        self.subscriptions.get(self.selected)
    }

    pub fn swipe_row(&self, id: i64) -> Option<&SwipeRow> {
        self.swipe.row(id)
    }

    pub fn move_down(&mut self) {
        if !self.subscriptions.is_empty() && self.selected < self.subscriptions.len() - 1 {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside a window of `height` rows
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        } else if self.selected >= self.list_offset + height {
            self.list_offset = self.selected + 1 - height;
        }
        let max_offset = self.subscriptions.len().saturating_sub(height);
        self.list_offset = self.list_offset.min(max_offset);
    }

    pub fn toggle_sheet(&mut self) {
        self.sheet.toggle();
    }

    /// Step to the next period; returns false while the sheet is moving
    pub fn cycle_period(&mut self) -> bool {
        match self.sheet.cycle_period(self.period) {
            Some(next) => {
                self.period = next;
                self.is_loading = true;
                true
            }
            None => false,
        }
    }

    pub fn set_tab(&mut self, tab: SheetTab) {
        self.tab = tab;
    }

    /// Replace the category list
    ///
    /// Returns true when the active filter named a category that no longer
    /// exists and was reset to all, so the caller should reload.
    pub fn apply_categories(&mut self, categories: Vec<Category>) -> bool {
        self.categories = categories;
        if let CategoryFilter::Id(id) = self.category {
            if !self.categories.iter().any(|c| c.id == id) {
                debug!(category = id, "Active category disappeared");
                self.category = CategoryFilter::All;
                return true;
            }
        }
        false
    }

    /// Step the filter through all, then each category in order
    pub fn cycle_category(&mut self) -> CategoryFilter {
        let next = match self.category {
            CategoryFilter::All => self.categories.first().map(|c| c.id),
            CategoryFilter::Id(id) => self
                .categories
                .iter()
                .position(|c| c.id == id)
                .and_then(|index| self.categories.get(index + 1))
                .map(|c| c.id),
        };
        self.category = next.map_or(CategoryFilter::All, CategoryFilter::Id);
        self.is_loading = true;
        self.category
    }

    /// Name of the active filter
    pub fn category_label(&self) -> &str {
        match self.category {
            CategoryFilter::All => "All",
            CategoryFilter::Id(id) => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.as_str())
                .unwrap_or("Category"),
        }
    }

    /// Destinations offered by the move picker: no category, then each category
    pub fn move_choices(&self) -> Vec<(Option<i64>, &str)> {
        std::iter::once((None, "No category"))
            .chain(self.categories.iter().map(|c| (Some(c.id), c.name.as_str())))
            .collect()
    }

    /// Move the picker highlight by `delta`, wrapping around
    pub fn step_move_choice(&mut self, delta: isize) {
        let count = self.categories.len() + 1;
        if let Mode::MovePick { choice, .. } = &mut self.mode {
            *choice = (*choice as isize + delta).rem_euclid(count as isize) as usize;
        }
    }

    fn subscription(&self, id: i64) -> Option<&SubscriptionRow> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    /// Open or close the selected row's rail from the keyboard
    pub fn settle_selected(&mut self, open: bool) -> bool {
        match self.selected_row().map(|row| row.id) {
            Some(id) => self.swipe.settle(id, open),
            None => false,
        }
    }

    /// Invoke a rail action on the selected row
    ///
    /// Delete and disable ask for confirmation and move opens the category
    /// picker; those yield no command until [`resolve_pending`](Self::resolve_pending).
    pub fn request_action(&mut self, action: RowAction) -> Option<RowCommand> {
        let id = self.selected_row()?.id;
        let command = self.swipe.trigger(id, action)?;
        match action {
            RowAction::Delete => self.mode = Mode::DeleteConfirm(command.row_id),
            RowAction::Disable => self.mode = Mode::DisableConfirm(command.row_id),
            RowAction::Move => {
                let current = self.subscription(command.row_id).and_then(|s| s.category_id);
                let choice = self
                    .move_choices()
                    .iter()
                    .position(|(id, _)| *id == current)
                    .unwrap_or(0);
                self.mode = Mode::MovePick {
                    row_id: command.row_id,
                    choice,
                };
            }
            RowAction::Edit => return Some(command),
        }
        None
    }

    /// Answer the pending prompt
    ///
    /// Yields the change to send when confirmed. Moving a row to the category
    /// it is already in yields nothing.
    pub fn resolve_pending(&mut self, confirmed: bool) -> Option<RowMutation> {
        let mode = std::mem::replace(&mut self.mode, Mode::Normal);
        if !confirmed {
            return None;
        }
        match mode {
            Mode::Normal => None,
            Mode::DeleteConfirm(id) => {
                let row = self.subscription(id)?;
                Some(RowMutation::Delete {
                    id,
                    name: row.name.clone(),
                })
            }
            Mode::DisableConfirm(id) => {
                let row = self.subscription(id)?;
                Some(RowMutation::SetDisabled {
                    id,
                    name: row.name.clone(),
                    disabled: !row.disabled,
                })
            }
            Mode::MovePick { row_id, choice } => {
                let category_id = self.move_choices().get(choice)?.0;
                let row = self.subscription(row_id)?;
                if row.category_id == category_id {
                    return None;
                }
                Some(RowMutation::SetCategory {
                    id: row_id,
                    name: row.name.clone(),
                    category_id,
                })
            }
        }
    }

    /// Route a pointer event at terminal cell `(column, row)`
    pub fn handle_pointer(&mut self, event: PointerEvent, column: u16, row: u16) -> Option<SwipeOutcome> {
        let hit = if event.kind == PointerKind::Down {
            self.row_at(column, row)
        } else {
            None
        };
        if let Some(id) = hit {
            if let Some(index) = self.subscriptions.iter().position(|s| s.id == id) {
                self.selected = index;
            }
        }
        self.swipe.dispatch(&event, hit).map(|(_, outcome)| outcome)
    }

    /// Subscription id drawn at a terminal cell
    pub fn row_at(&self, column: u16, row: u16) -> Option<i64> {
        let area = self.list_area;
        // Rows start inside the top border
        let top = area.y.saturating_add(1);
        let bottom = area.y.saturating_add(area.height).saturating_sub(1);
        if column < area.x || column >= area.x.saturating_add(area.width) || row < top || row >= bottom {
            return None;
        }
        let index = self.list_offset + usize::from(row - top);
        self.subscriptions.get(index).map(|s| s.id)
    }

    /// Escape: leave the prompt, else close the sheet, else close rails
    pub fn escape(&mut self) {
        if self.mode != Mode::Normal {
            self.mode = Mode::Normal;
        } else if self.sheet.is_visible() {
            self.sheet.close();
        } else {
            self.swipe.reset_all();
        }
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtrack_core::motion::ManualClock;
    use subtrack_core::stats::{BreakdownItem, CategoryItem};

    fn app() -> (ManualClock, App<ManualClock>) {
        let clock = ManualClock::new();
        let app = App::with_clock(Arc::new(AppConfig::default()), Theme::default(), clock.clone());
        (clock, app)
    }

    fn row(id: i64) -> SubscriptionRow {
        SubscriptionRow {
            id,
            name: format!("Sub {id}"),
            icon: None,
            color: None,
            price: 9.99,
            display_price: Some(9.99),
            currency_symbol: "$".to_string(),
            period_label: "1 MONTH".to_string(),
            category_id: None,
            disabled: false,
        }
    }

    fn load_rows(app: &mut App<ManualClock>, ids: &[i64]) {
        let ticket = app.list_generation.begin();
        assert!(app.apply_subscriptions(ticket, ids.iter().map(|id| row(*id)).collect()));
    }

    fn snapshot(app: &App<ManualClock>) -> StatsSnapshot {
        StatsSnapshot {
            ticket: RequestGeneration::new().begin(),
            query: app.query(),
            summary: StatsSummary {
                total: 30.0,
                breakdown: vec![BreakdownItem {
                    id: 1,
                    name: "Music".to_string(),
                    category_id: Some(1),
                    color: Some("#ff0000".to_string()),
                    value: 30.0,
                }],
                ..Default::default()
            },
            by_category: CategoryStats {
                items: vec![CategoryItem {
                    category_id: 1,
                    name: "Media".to_string(),
                    color: Some("#00ff00".to_string()),
                    value: 30.0,
                }],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_stale_list_is_discarded() {
        let (_, mut app) = app();
        let old = app.list_generation.begin();
        let new = app.list_generation.begin();
        assert!(!app.apply_subscriptions(old, vec![row(1)]));
        assert!(app.subscriptions.is_empty());
        assert!(app.apply_subscriptions(new, vec![row(2)]));
        assert_eq!(app.subscriptions[0].id, 2);
        assert_eq!(app.swipe.len(), 1);
    }

    #[test]
    fn test_apply_stats_starts_animations() {
        let (clock, mut app) = app();
        app.apply_stats(snapshot(&app));
        assert!(app.is_animating());
        assert_eq!(app.bars.value("sub-1"), 0.0);

        clock.advance_ms(1000);
        assert!(app.tick());
        assert_eq!(app.bars.value("sub-1"), 30.0);
        assert_eq!(app.category_bars.value("cat-1"), 30.0);
        assert_eq!(app.donut.coverage(), 100.0);
        assert!(!app.is_animating());
    }

    #[test]
    fn test_outdated_stats_ignored() {
        let (_, mut app) = app();
        let snap = snapshot(&app);
        assert!(app.cycle_period());
        app.apply_stats(snap);
        assert_eq!(app.summary.total, 0.0);
    }

    #[test]
    fn test_period_cycle_blocked_while_sheet_moves() {
        let (clock, mut app) = app();
        app.toggle_sheet();
        assert!(!app.cycle_period());
        assert_eq!(app.period, Period::Month);

        clock.advance_ms(1000);
        app.tick();
        assert!(app.cycle_period());
        assert_eq!(app.period, Period::Quarter);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (_, mut app) = app();
        load_rows(&mut app, &[1, 2]);
        app.move_down();

        // Hidden rail: nothing to trigger
        assert_eq!(app.request_action(RowAction::Disable), None);

        assert!(app.settle_selected(true));
        assert_eq!(app.request_action(RowAction::Delete), None);
        assert_eq!(app.mode, Mode::DeleteConfirm(2));

        let mutation = app.resolve_pending(true).unwrap();
        assert_eq!(
            mutation,
            RowMutation::Delete {
                id: 2,
                name: "Sub 2".to_string()
            }
        );
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.resolve_pending(true), None);
    }

    #[test]
    fn test_disable_requires_confirmation() {
        let (_, mut app) = app();
        load_rows(&mut app, &[1]);
        assert!(app.settle_selected(true));

        assert_eq!(app.request_action(RowAction::Disable), None);
        assert_eq!(app.mode, Mode::DisableConfirm(1));
        assert_eq!(app.resolve_pending(false), None);
        assert_eq!(app.mode, Mode::Normal);

        // Triggering closed the rail
        assert_eq!(app.request_action(RowAction::Disable), None);
        app.settle_selected(true);
        app.request_action(RowAction::Disable);
        assert_eq!(
            app.resolve_pending(true),
            Some(RowMutation::SetDisabled {
                id: 1,
                name: "Sub 1".to_string(),
                disabled: true
            })
        );

        // Edit needs no prompt
        app.settle_selected(true);
        let command = app.request_action(RowAction::Edit).unwrap();
        assert_eq!(command.row_id, 1);
        assert_eq!(app.mode, Mode::Normal);
    }

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: 4,
                name: "Media".to_string(),
                color: None,
            },
            Category {
                id: 9,
                name: "Work".to_string(),
                color: Some("#3b82f6".to_string()),
            },
        ]
    }

    #[test]
    fn test_category_filter_cycles_and_resets() {
        let (_, mut app) = app();
        assert_eq!(app.cycle_category(), CategoryFilter::All);

        assert!(!app.apply_categories(categories()));
        assert_eq!(app.cycle_category(), CategoryFilter::Id(4));
        assert_eq!(app.category_label(), "Media");
        assert_eq!(app.query().category, CategoryFilter::Id(4));
        assert!(app.is_loading);
        assert_eq!(app.cycle_category(), CategoryFilter::Id(9));
        assert_eq!(app.cycle_category(), CategoryFilter::All);
        assert_eq!(app.category_label(), "All");

        // A filter on a category that went away falls back to all
        app.cycle_category();
        assert!(app.apply_categories(categories()[1..].to_vec()));
        assert_eq!(app.category, CategoryFilter::All);
    }

    #[test]
    fn test_move_picks_category_and_resets_row() {
        let (_, mut app) = app();
        app.apply_categories(categories());
        load_rows(&mut app, &[1]);
        assert!(app.settle_selected(true));

        assert_eq!(app.request_action(RowAction::Move), None);
        assert_eq!(app.mode, Mode::MovePick { row_id: 1, choice: 0 });

        // Staying uncategorised changes nothing
        assert_eq!(app.resolve_pending(true), None);

        app.settle_selected(true);
        app.request_action(RowAction::Move);
        app.step_move_choice(-1);
        assert_eq!(app.mode, Mode::MovePick { row_id: 1, choice: 2 });
        app.step_move_choice(1);
        app.step_move_choice(1);
        assert_eq!(
            app.resolve_pending(true),
            Some(RowMutation::SetCategory {
                id: 1,
                name: "Sub 1".to_string(),
                category_id: Some(4)
            })
        );

        // The reloaded row carries its new category, which closes its rail
        app.settle_selected(true);
        let ticket = app.list_generation.begin();
        let mut moved = row(1);
        moved.category_id = Some(4);
        assert!(app.apply_subscriptions(ticket, vec![moved]));
        assert!(!app.swipe_row(1).unwrap().is_open());

        // The picker starts on the row's current category
        app.settle_selected(true);
        app.request_action(RowAction::Move);
        assert_eq!(app.mode, Mode::MovePick { row_id: 1, choice: 1 });
    }

    #[test]
    fn test_pointer_hit_testing() {
        let (_, mut app) = app();
        load_rows(&mut app, &[10, 20, 30]);
        app.list_area = Rect::new(0, 2, 40, 10);

        // Border row and outside columns miss
        assert_eq!(app.row_at(5, 2), None);
        assert_eq!(app.row_at(45, 3), None);
        assert_eq!(app.row_at(5, 3), Some(10));
        assert_eq!(app.row_at(5, 5), Some(30));
        assert_eq!(app.row_at(5, 6), None);

        let cell = app.config.ui.cell_width_px;
        let max = app.config.swipe.max_offset;
        app.handle_pointer(PointerEvent::down(1, 30.0 * cell), 30, 4);
        assert_eq!(app.selected, 1);
        app.handle_pointer(PointerEvent::moved(1, 30.0 * cell - max), 13, 4);
        let outcome = app.handle_pointer(PointerEvent::up(1, 30.0 * cell - max), 13, 4);
        assert_eq!(outcome, Some(SwipeOutcome::Opened));
        assert!(app.swipe_row(20).unwrap().is_open());
    }

    #[test]
    fn test_escape_order() {
        let (clock, mut app) = app();
        load_rows(&mut app, &[1]);
        app.settle_selected(true);
        app.toggle_sheet();
        clock.advance_ms(1000);
        app.tick();

        app.escape();
        assert!(!app.sheet.is_visible());
        assert!(app.swipe_row(1).unwrap().is_open());

        app.escape();
        assert!(!app.swipe_row(1).unwrap().is_open());
    }

    #[test]
    fn test_ensure_visible() {
        let (_, mut app) = app();
        load_rows(&mut app, &(1..=10).collect::<Vec<_>>());
        app.selected = 7;
        app.ensure_visible(3);
        assert_eq!(app.list_offset, 5);
        app.selected = 2;
        app.ensure_visible(3);
        assert_eq!(app.list_offset, 2);
    }
}
