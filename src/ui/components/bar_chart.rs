use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;
use tracing::debug;

use crate::engine::chart_data::{ChartSeries, SeriesPoint};
use crate::engine::debounce::Debouncer;
use crate::ui::theme::Theme;

/// Rows reserved whatever the series length, so switching categories
/// does not make the chart jump.
pub const RESERVED_ROWS: usize = 4;
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(16);
pub const TICK_COUNT: usize = 5;

const NICE_BOUNDS: [f64; 6] = [10.0, 20.0, 50.0, 100.0, 200.0, 500.0];
// Each row is a bar line plus a gap line; one more line carries the axis.
const LINES_PER_ROW: u16 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChartOptions {
    pub percent: bool,
}

/// Upper bound of the horizontal axis.
pub fn nice_scale(max: f64, percent: bool) -> f64 {
    if percent {
        return 100.0;
    }
    let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
    let target = (max * 11.0 / 10.0).max(10.0);
    NICE_BOUNDS
        .iter()
        .copied()
        .find(|&bound| target <= bound)
        .unwrap_or_else(|| (target / 100.0).ceil() * 100.0)
}

pub fn ticks(scale: f64) -> [f64; TICK_COUNT] {
    std::array::from_fn(|i| scale * i as f64 / (TICK_COUNT - 1) as f64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarRow {
    pub label: String,
    pub value: f64,
    /// Filled cells.
    pub fill: u16,
    pub value_label: String,
    pub label_inside: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub area: Rect,
    pub label_width: u16,
    pub bar_width: u16,
    pub scale: f64,
    pub ticks: [f64; TICK_COUNT],
    pub rows: Vec<BarRow>,
}

impl ChartLayout {
    pub fn compute(series: &[SeriesPoint], options: ChartOptions, area: Rect) -> Self {
        let max = series.iter().map(|p| p.value).fold(0.0f64, f64::max);
        let scale = nice_scale(max, options.percent);

        let label_width = series
            .iter()
            .map(|p| p.label.chars().count() as u16)
            .max()
            .unwrap_or(0)
            + 1;
        // Right margin leaves room for the last tick label.
        let tick_room = format_value(scale, options.percent).len() as u16;
        let bar_width = area
            .width
            .saturating_sub(label_width)
            .saturating_sub(tick_room);

        let rows = series
            .iter()
            .take(RESERVED_ROWS)
            .map(|point| {
                let value = if point.value.is_finite() {
                    point.value.clamp(0.0, scale)
                } else {
                    0.0
                };
                let fill = ((value / scale) * bar_width as f64).round() as u16;
                let value_label = format_value(value, options.percent);
                let label_inside = value_label.chars().count() as u16 + 2 <= fill;
                BarRow {
                    label: point.label.clone(),
                    value,
                    fill: fill.min(bar_width),
                    value_label,
                    label_inside,
                }
            })
            .collect();

        Self {
            area,
            label_width,
            bar_width,
            scale,
            ticks: ticks(scale),
            rows,
        }
    }

    /// Lines needed to show every reserved row and the axis.
    pub fn required_height() -> u16 {
        RESERVED_ROWS as u16 * LINES_PER_ROW + 1
    }

    pub fn tick_column(&self, tick: usize) -> u16 {
        let span = self.bar_width.saturating_sub(1) as usize;
        (span * tick / (TICK_COUNT - 1)) as u16
    }
}

fn format_value(value: f64, percent: bool) -> String {
    if percent {
        format!("{value:.0}%")
    } else {
        format!("{value:.0}")
    }
}

// Quarter ticks of a scale of 10 land on halves.
fn format_tick(value: f64, percent: bool) -> String {
    if value.fract() == 0.0 {
        format_value(value, percent)
    } else if percent {
        format!("{value:.1}%")
    } else {
        format!("{value:.1}")
    }
}

/// Owns a series and its layout, re-laying out on resize after a short
/// debounce.
pub struct BarChartView {
    series: ChartSeries,
    options: ChartOptions,
    layout: ChartLayout,
    pending_area: Option<Rect>,
    resize: Debouncer,
    disposed: bool,
    layout_passes: u32,
}

impl BarChartView {
    pub fn new(series: ChartSeries, options: ChartOptions, area: Rect) -> Self {
        let layout = ChartLayout::compute(&series, options, area);
        Self {
            series,
            options,
            layout,
            pending_area: None,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            disposed: false,
            layout_passes: 1,
        }
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn series(&self) -> &[SeriesPoint] {
        &self.series
    }

    pub fn options(&self) -> ChartOptions {
        self.options
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn layout_passes(&self) -> u32 {
        self.layout_passes
    }

    pub fn has_pending_resize(&self) -> bool {
        self.resize.is_pending()
    }

    /// Replace the data and lay out immediately.
    pub fn update(&mut self, series: ChartSeries, options: ChartOptions) {
        if self.disposed {
            debug!("update on disposed chart ignored");
            return;
        }
        self.series = series;
        self.options = options;
        self.relayout(self.layout.area);
    }

    /// Note a new container size. Layout waits until the debounce elapses.
    pub fn observe_resize(&mut self, area: Rect, now: Instant) {
        if self.disposed {
            return;
        }
        if area == self.layout.area && self.pending_area.is_none() {
            return;
        }
        self.pending_area = Some(area);
        self.resize.schedule(now);
    }

    /// Apply a due resize. Returns true if the layout changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.disposed || !self.resize.take_due(now) {
            return false;
        }
        match self.pending_area.take() {
            Some(area) => {
                self.relayout(area);
                true
            }
            None => false,
        }
    }

    /// Stop observing resizes and drop any pending re-layout.
    pub fn dispose(&mut self) {
        self.resize.cancel();
        self.pending_area = None;
        self.disposed = true;
    }

    pub fn widget<'a>(&'a self, theme: &'a Theme) -> HorizontalBarChart<'a> {
        HorizontalBarChart {
            layout: &self.layout,
            percent: self.options.percent,
            theme,
        }
    }

    fn relayout(&mut self, area: Rect) {
        self.layout = ChartLayout::compute(&self.series, self.options, area);
        self.layout_passes += 1;
    }
}

pub struct HorizontalBarChart<'a> {
    layout: &'a ChartLayout,
    percent: bool,
    theme: &'a Theme,
}

impl Widget for HorizontalBarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let layout = self.layout;
        if area.width <= layout.label_width || area.height == 0 {
            return;
        }

        let bar_x = area.x + layout.label_width;
        let bar_end = (bar_x + layout.bar_width).min(area.right());
        let dim = Style::default().fg(colors.text_dim());

        for (i, row) in layout.rows.iter().enumerate() {
            let y = area.y + i as u16 * LINES_PER_ROW;
            if y >= area.bottom() {
                break;
            }
            buf.set_string(area.x, y, &row.label, Style::default().fg(colors.fg()));

            for x in bar_x..bar_end {
                let (ch, color) = if x - bar_x < row.fill {
                    ("█", colors.bar_filled())
                } else {
                    ("░", colors.bar_empty())
                };
                buf.set_string(x, y, ch, Style::default().fg(color));
            }

            let value_width = row.value_label.chars().count() as u16;
            if row.label_inside {
                let x = bar_x + row.fill - value_width - 1;
                buf.set_string(
                    x,
                    y,
                    &row.value_label,
                    Style::default()
                        .fg(colors.bg())
                        .bg(colors.bar_filled())
                        .add_modifier(Modifier::BOLD),
                );
            } else {
                let x = bar_x + row.fill + 1;
                if x + value_width <= area.right() {
                    buf.set_string(x, y, &row.value_label, Style::default().fg(colors.accent()));
                }
            }

            let gap_y = y + 1;
            if gap_y < area.bottom() {
                for t in 0..TICK_COUNT {
                    let x = bar_x + layout.tick_column(t);
                    if x < bar_end {
                        buf.set_string(x, gap_y, "┊", dim);
                    }
                }
            }
        }

        let axis_y = area.y + RESERVED_ROWS as u16 * LINES_PER_ROW;
        if axis_y >= area.bottom() {
            return;
        }
        for (t, tick) in layout.ticks.iter().enumerate() {
            let text = format_tick(*tick, self.percent);
            let width = text.chars().count() as u16;
            let col = bar_x + layout.tick_column(t);
            let x = col.saturating_sub(width / 2).max(bar_x);
            if x + width <= area.right() {
                buf.set_string(x, axis_y, &text, dim);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::debounce::{Clock, ManualClock};

    fn point(label: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            label: label.to_string(),
            value,
        }
    }

    fn level_series(values: [f64; 4]) -> ChartSeries {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| point(&format!("Level {}", i + 1), *v))
            .collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_nice_scale_boundaries() {
        assert_eq!(nice_scale(0.0, false), 10.0);
        assert_eq!(nice_scale(9.0, false), 10.0);
        assert_eq!(nice_scale(10.0, false), 20.0);
        assert_eq!(nice_scale(18.0, false), 20.0);
        assert_eq!(nice_scale(19.0, false), 50.0);
        assert_eq!(nice_scale(90.0, false), 100.0);
        assert_eq!(nice_scale(91.0, false), 200.0);
        assert_eq!(nice_scale(181.0, false), 200.0);
        assert_eq!(nice_scale(182.0, false), 500.0);
        assert_eq!(nice_scale(454.0, false), 500.0);
        assert_eq!(nice_scale(455.0, false), 600.0);
        assert_eq!(nice_scale(1000.0, false), 1100.0);
    }

    #[test]
    fn test_percent_scale_is_fixed() {
        assert_eq!(nice_scale(3.0, true), 100.0);
        assert_eq!(nice_scale(100.0, true), 100.0);
    }

    #[test]
    fn test_bad_max_falls_back_to_minimum() {
        assert_eq!(nice_scale(f64::NAN, false), 10.0);
        assert_eq!(nice_scale(-5.0, false), 10.0);
    }

    #[test]
    fn test_ticks_quarter_the_scale() {
        assert_eq!(ticks(200.0), [0.0, 50.0, 100.0, 150.0, 200.0]);
    }

    #[test]
    fn test_layout_reserves_four_rows() {
        let short = vec![point("(+)", 1.0)];
        assert_eq!(ChartLayout::required_height(), 9);
        let layout = ChartLayout::compute(&short, ChartOptions::default(), Rect::new(0, 0, 40, 9));
        assert_eq!(layout.rows.len(), 1);
        assert_eq!(layout.label_width, 4);
    }

    #[test]
    fn test_values_are_clamped_to_scale() {
        let series = level_series([150.0, -3.0, 0.0, 10.0]);
        let options = ChartOptions { percent: true };
        let layout = ChartLayout::compute(&series, options, Rect::new(0, 0, 60, 9));
        assert_eq!(layout.rows[0].value, 100.0);
        assert_eq!(layout.rows[0].fill, layout.bar_width);
        assert_eq!(layout.rows[1].value, 0.0);
        assert_eq!(layout.rows[1].fill, 0);
        assert_eq!(layout.rows[0].value_label, "100%");
    }

    #[test]
    fn test_value_label_inside_only_when_it_fits() {
        let series = level_series([18.0, 1.0, 0.0, 0.0]);
        let layout = ChartLayout::compute(&series, ChartOptions::default(), Rect::new(0, 0, 50, 9));
        assert!(layout.rows[0].label_inside);
        assert!(!layout.rows[1].label_inside);
    }

    #[test]
    fn test_render_draws_labels_bars_and_axis() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 9);
        let view = BarChartView::new(level_series([5.0, 0.0, 2.0, 0.0]), ChartOptions::default(), area);
        let mut buf = Buffer::empty(area);
        view.widget(&theme).render(area, &mut buf);

        assert!(row_text(&buf, 0).starts_with("Level 1 █"));
        assert!(row_text(&buf, 2).starts_with("Level 2 ░"));
        let axis = row_text(&buf, 8);
        assert!(axis.contains('0'));
        assert!(axis.contains("10"));
        assert!(axis.contains("2.5"));
    }

    #[test]
    fn test_resize_is_debounced() {
        let clock = ManualClock::new();
        let mut view = BarChartView::new(level_series([1.0; 4]), ChartOptions::default(), Rect::new(0, 0, 40, 9));
        for w in 41..50 {
            view.observe_resize(Rect::new(0, 0, w, 9), clock.now());
            clock.advance(Duration::from_millis(5));
            assert!(!view.poll(clock.now()));
        }
        clock.advance(RESIZE_DEBOUNCE);
        assert!(view.poll(clock.now()));
        assert_eq!(view.layout().area.width, 49);
        assert_eq!(view.layout_passes(), 2);
    }

    #[test]
    fn test_same_size_resize_is_noop() {
        let clock = ManualClock::new();
        let area = Rect::new(0, 0, 40, 9);
        let mut view = BarChartView::new(level_series([1.0; 4]), ChartOptions::default(), area);
        view.observe_resize(area, clock.now());
        assert!(!view.has_pending_resize());
    }

    #[test]
    fn test_dispose_cancels_pending_and_ignores_further_resizes() {
        let clock = ManualClock::new();
        let mut view = BarChartView::new(level_series([1.0; 4]), ChartOptions::default(), Rect::new(0, 0, 40, 9));
        view.observe_resize(Rect::new(0, 0, 60, 9), clock.now());
        view.dispose();
        assert!(!view.has_pending_resize());

        view.observe_resize(Rect::new(0, 0, 70, 9), clock.now());
        clock.advance(Duration::from_millis(100));
        assert!(!view.poll(clock.now()));
        assert_eq!(view.layout().area.width, 40);
        assert_eq!(view.layout_passes(), 1);
    }

    #[test]
    fn test_update_relays_out_immediately() {
        let mut view = BarChartView::new(level_series([1.0; 4]), ChartOptions::default(), Rect::new(0, 0, 40, 9));
        view.update(level_series([300.0, 0.0, 0.0, 0.0]), ChartOptions::default());
        assert_eq!(view.layout().scale, 500.0);
        assert_eq!(view.series()[0].value, 300.0);
    }
}
