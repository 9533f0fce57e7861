//! Figures: position density, prediction pie charts and matrix-score box
//! plots, rendered as SVG.
//!
//! Every function returns `Ok(false)` without touching the file system when
//! there is nothing to draw.

use std::error::Error;
use std::path::Path;

use plotters::element::Pie;
use plotters::prelude::*;

use crate::classify::VariantSets;
use crate::matrix::SubstitutionMatrix;
use crate::stats::{BoxSummary, Kde};
use crate::tally::Collection;

pub const DENSITY_PLOT: &str = "substitution_distribution_density_plot.svg";
pub const TEST_PIE: &str = "test_substitutions_pie_chart.svg";
pub const TRAIN_PIE: &str = "train_substitutions_pie_chart.svg";
pub const PREDICTED_PIE: &str = "predicted_substitutions_pie_chart.svg";
pub const BLOSUM80_BOXPLOT: &str = "blosum80_boxplot.svg";
pub const PAM30_BOXPLOT: &str = "pam30_boxplot.svg";

/// Positions this close to the window start are left out of the density.
pub const EDGE_TRIM: usize = 10;

const KDE_ADJUST: f64 = 0.2;
const KDE_CUT: f64 = 3.0;
const KDE_GRIDSIZE: usize = 200;

// seaborn "colorblind"
const PALETTE: [RGBColor; 6] = [
    RGBColor(1, 115, 178),
    RGBColor(222, 143, 5),
    RGBColor(2, 158, 115),
    RGBColor(213, 94, 0),
    RGBColor(204, 120, 188),
    RGBColor(202, 145, 97),
];

fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

type Groups = Vec<(&'static str, Vec<f64>)>;

const GROUP_ORDER: [Collection; 3] = [Collection::Train, Collection::Test, Collection::Predict];

/// Substitution positions per group, keeping positions `>= min_position`.
pub fn position_groups(sets: &VariantSets, min_position: usize) -> Groups {
    GROUP_ORDER
        .iter()
        .map(|&c| {
            let positions = sets
                .get(c)
                .iter()
                .filter(|s| s.position >= min_position)
                .map(|s| s.position as f64)
                .collect();
            (c.group(), positions)
        })
        .collect()
}

/// Matrix scores per group, followed by the random baseline.
pub fn score_groups(sets: &VariantSets, matrix: &SubstitutionMatrix, random: &[i32]) -> Groups {
    let mut groups: Groups = GROUP_ORDER
        .iter()
        .map(|&c| {
            let scores = sets
                .get(c)
                .iter()
                .filter_map(|s| s.score(matrix))
                .map(f64::from)
                .collect();
            (c.group(), scores)
        })
        .collect();
    groups.push(("random", random.iter().copied().map(f64::from).collect()));
    groups
}

pub fn density_plot(path: &Path, groups: &[(&str, Vec<f64>)]) -> Result<bool, Box<dyn Error>> {
    let curves: Vec<(&str, RGBColor, Vec<(f64, f64)>)> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, (name, values))| {
            let kde = Kde::new(values, KDE_ADJUST)?;
            Some((*name, palette(i), kde.curve(KDE_CUT, KDE_GRIDSIZE)))
        })
        .collect();
    if curves.is_empty() {
        return Ok(false);
    }

    let points = curves.iter().flat_map(|(_, _, pts)| pts.iter());
    let (mut x_min, mut x_max, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY, 0.0f64);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Substitution positions", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)?;
    chart
        .configure_mesh()
        .x_desc("value")
        .y_desc("Density")
        .draw()?;

    for (name, color, pts) in curves {
        chart.draw_series(AreaSeries::new(pts.iter().copied(), 0.0, color.mix(0.25)))?;
        chart
            .draw_series(LineSeries::new(pts, color.stroke_width(2)))?
            .label(name)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(true)
}

/// Pie chart of labelled counts; empty slices are dropped.
pub fn pie_chart(
    path: &Path,
    title: &str,
    slices: &[(&str, usize)],
) -> Result<bool, Box<dyn Error>> {
    let shown: Vec<(&str, usize)> = slices.iter().copied().filter(|(_, n)| *n > 0).collect();
    if shown.is_empty() {
        return Ok(false);
    }
    let sizes: Vec<f64> = shown.iter().map(|(_, n)| *n as f64).collect();
    let labels: Vec<String> = shown.iter().map(|(label, _)| label.to_string()).collect();
    let colors: Vec<RGBColor> = (0..shown.len()).map(palette).collect();

    let root = SVGBackend::new(path, (640, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(title, ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = w.min(h) as f64 * 0.32;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()?;
    Ok(true)
}

/// Box plot per group without outliers.
pub fn box_plot(
    path: &Path,
    title: &str,
    groups: &[(&str, Vec<f64>)],
) -> Result<bool, Box<dyn Error>> {
    let boxes: Vec<(usize, &str, BoxSummary)> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, (name, values))| BoxSummary::new(values).map(|s| (i, *name, s)))
        .collect();
    if boxes.is_empty() {
        return Ok(false);
    }

    let lo = boxes.iter().map(|(_, _, s)| s.lower_whisker).fold(f64::INFINITY, f64::min);
    let hi = boxes.iter().map(|(_, _, s)| s.upper_whisker).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.1).max(1.0);
    let n = boxes.len();

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(20)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (lo - 2.0 * pad)..(hi + pad))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc("value")
        .draw()?;

    for (slot, (i, name, s)) in boxes.iter().enumerate() {
        let x = slot as f64;
        let color = palette(*i);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.3, s.q1), (x + 0.3, s.q3)],
            color.filled(),
        )))?;
        let line = |points: Vec<(f64, f64)>| PathElement::new(points, BLACK.stroke_width(1));
        chart.draw_series([
            // box outline
            line(vec![
                (x - 0.3, s.q1),
                (x + 0.3, s.q1),
                (x + 0.3, s.q3),
                (x - 0.3, s.q3),
                (x - 0.3, s.q1),
            ]),
            PathElement::new(vec![(x - 0.3, s.median), (x + 0.3, s.median)], BLACK.stroke_width(2)),
            line(vec![(x, s.q3), (x, s.upper_whisker)]),
            line(vec![(x, s.q1), (x, s.lower_whisker)]),
            line(vec![(x - 0.15, s.upper_whisker), (x + 0.15, s.upper_whisker)]),
            line(vec![(x - 0.15, s.lower_whisker), (x + 0.15, s.lower_whisker)]),
        ])?;
        chart.draw_series(std::iter::once(Text::new(
            name.to_string(),
            (x - 0.1, lo - pad),
            ("sans-serif", 16).into_font(),
        )))?;
    }

    root.present()?;
    Ok(true)
}
