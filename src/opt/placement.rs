//! Turns one chromosome into a concrete layout.
//!
//! Parts are taken in chromosome order (priority parts pulled to the front),
//! each tried at its chosen rotation first and its remaining allowed
//! rotations after. Sheets open lazily: every already-open sheet is tried
//! before the next unused one. On a sheet, the set of valid positions for
//! the part's reference vertex is the inner-fit polygon of the sheet minus
//! the interiors of the no-fit polygons against every part already placed
//! there; candidate positions are the region's vertices plus pairwise edge
//! intersections, and the configured strategy picks among them.

use log::debug;
use ordered_float::OrderedFloat;

use crate::config::{NestConfig, PlacementStrategy};
use crate::entities::{NestResult, PartPlacement, Polygon, SheetLayout};
use crate::ga::{Chromosome, PartInstance};
use crate::geometry::convex_hull::convex_hull_area;
use crate::geometry::nfp;
use crate::geometry::primitives::{Point, Rect};
use crate::opt::fitness;

pub struct PlacementWorker<'a> {
    pub config: &'a NestConfig,
    /// Sheet clones for this iteration, in inventory order.
    pub sheets: &'a [Polygon],
    pub instances: &'a [PartInstance],
}

struct OpenSheet {
    index: usize,
    /// Rotated part clones with their translation applied via `x`/`y`.
    placed: Vec<Polygon>,
    parts_area: f64,
    merged_length: f64,
}

impl<'a> PlacementWorker<'a> {
    pub fn new(
        config: &'a NestConfig,
        sheets: &'a [Polygon],
        instances: &'a [PartInstance],
    ) -> Self {
        PlacementWorker {
            config,
            sheets,
            instances,
        }
    }

    /// Places every gene of the chromosome, never failing: parts that fit
    /// nowhere are recorded as unplaced.
    pub fn place(&self, chromosome: &Chromosome) -> NestResult {
        let eps = self.config.geometry_eps();

        // stable partition: priority parts first, order otherwise preserved
        let (front, back): (Vec<_>, Vec<_>) = chromosome
            .genes
            .iter()
            .partition(|g| self.instances[g.instance].priority);

        let mut open: Vec<OpenSheet> = Vec::new();
        let mut used = vec![false; self.sheets.len()];
        let mut unplaced: Vec<usize> = Vec::new();

        for gene in front.iter().chain(back.iter()) {
            let instance = &self.instances[gene.instance];
            let mut rotations = vec![gene.rotation];
            rotations.extend(
                instance
                    .allowed_rotations
                    .iter()
                    .copied()
                    .filter(|r| *r != gene.rotation),
            );

            let mut placed = false;
            'rotations: for rot in rotations {
                let rotated = instance.template.rotated(rot);

                for sheet_state in open.iter_mut() {
                    let sheet = &self.sheets[sheet_state.index];
                    if let Some((t, merged)) =
                        self.try_place(sheet, &sheet_state.placed, &rotated, eps)
                    {
                        commit(sheet_state, instance, rotated, t, merged);
                        placed = true;
                        break 'rotations;
                    }
                }

                for (si, sheet) in self.sheets.iter().enumerate() {
                    if used[si] {
                        continue;
                    }
                    if let Some((t, merged)) = self.try_place(sheet, &[], &rotated, eps) {
                        let mut sheet_state = OpenSheet {
                            index: si,
                            placed: Vec::new(),
                            parts_area: 0.0,
                            merged_length: 0.0,
                        };
                        commit(&mut sheet_state, instance, rotated, t, merged);
                        open.push(sheet_state);
                        used[si] = true;
                        placed = true;
                        break 'rotations;
                    }
                }
            }

            if !placed {
                debug!("part {} (source {}) fits nowhere", instance.id, instance.template.source);
                unplaced.push(instance.id);
            }
        }

        let layouts: Vec<SheetLayout> = open
            .iter()
            .map(|s| self.layout_of(s))
            .collect();
        let merged_length = layouts.iter().map(|l| l.merged_length).sum();
        let fitness = fitness::evaluate(&layouts, unplaced.len());
        NestResult {
            layouts,
            unplaced,
            merged_length,
            fitness,
        }
    }

    /// Best valid position for `rotated` on this sheet, or `None` when no
    /// valid position exists (including any NFP trace failure, which makes
    /// non-overlap unverifiable). Returns the translation and the
    /// coincident-edge length gained.
    fn try_place(
        &self,
        sheet: &Polygon,
        placed: &[Polygon],
        rotated: &Polygon,
        eps: f64,
    ) -> Option<(Point, f64)> {
        let ifp = nfp::inner_fit_polygon(&sheet.points, &rotated.points, eps)?;

        let mut nfps: Vec<Vec<Point>> = Vec::with_capacity(placed.len());
        for p in placed {
            let mut nfp_loop = nfp::no_fit_polygon(&p.points, &rotated.points, eps)?;
            for q in nfp_loop.iter_mut() {
                *q = Point(q.0 + p.x, q.1 + p.y);
            }
            nfps.push(nfp_loop);
        }

        let candidates = candidate_positions(&ifp, &nfps, eps);

        let placed_points: Vec<Point> =
            placed.iter().flat_map(|p| p.translated_points()).collect();
        let reference = rotated.points[0];

        let mut best: Option<((OrderedFloat<f64>, OrderedFloat<f64>, OrderedFloat<f64>), Point)> =
            None;
        for cand in candidates {
            if !position_valid(&ifp, &nfps, cand, eps) {
                continue;
            }
            let t = cand - reference;
            let key = match self.config.placement_strategy {
                PlacementStrategy::Gravity => {
                    (OrderedFloat(0.0), OrderedFloat(t.1), OrderedFloat(t.0))
                }
                PlacementStrategy::BoundingBox => {
                    let mut all: Vec<Point> = placed_points.clone();
                    all.extend(rotated.points.iter().map(|p| *p + t));
                    let area = Rect::from_points(&all).map_or(0.0, |r| r.area());
                    (OrderedFloat(area), OrderedFloat(t.1), OrderedFloat(t.0))
                }
                PlacementStrategy::Squeeze => {
                    let mut all: Vec<Point> = placed_points.clone();
                    all.extend(rotated.points.iter().map(|p| *p + t));
                    (
                        OrderedFloat(convex_hull_area(all)),
                        OrderedFloat(t.1),
                        OrderedFloat(t.0),
                    )
                }
            };
            if best.as_ref().is_none_or(|(bk, _)| key < *bk) {
                best = Some((key, t));
            }
        }

        let (_, t) = best?;
        let merged = merged_length_gain(placed, rotated, t, eps);
        Some((t, merged))
    }

    fn layout_of(&self, state: &OpenSheet) -> SheetLayout {
        let sheet = &self.sheets[state.index];
        let placements: Vec<PartPlacement> = state
            .placed
            .iter()
            .map(|p| PartPlacement {
                id: p.id,
                source: p.source,
                x: p.x,
                y: p.y,
                rotation: p.rotation,
            })
            .collect();
        let hull_points: Vec<Point> = state
            .placed
            .iter()
            .flat_map(|p| p.translated_points())
            .collect();
        let bounds = Rect::from_points(&hull_points)
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        SheetLayout {
            sheet_id: sheet.id,
            sheet_source: sheet.source,
            sheet_area: sheet.net_area(),
            strategy: self.config.placement_strategy,
            placements,
            parts_area: state.parts_area,
            bounds,
            hull_points,
            merged_length: state.merged_length,
        }
    }
}

fn commit(state: &mut OpenSheet, instance: &PartInstance, rotated: Polygon, t: Point, merged: f64) {
    let mut part = rotated;
    part.id = instance.id;
    part.source = instance.template.source;
    part.x = t.0;
    part.y = t.1;
    state.parts_area += part.net_area();
    state.merged_length += merged;
    state.placed.push(part);
}

/// Vertices of the inner-fit region and all no-fit loops, plus their
/// pairwise edge intersections, deduplicated within `eps`.
fn candidate_positions(ifp: &[Point], nfps: &[Vec<Point>], eps: f64) -> Vec<Point> {
    let mut loops: Vec<&[Point]> = vec![ifp];
    loops.extend(nfps.iter().map(|v| v.as_slice()));

    let mut candidates: Vec<Point> = loops.iter().flat_map(|l| l.iter().copied()).collect();
    for i in 0..loops.len() {
        for j in (i + 1)..loops.len() {
            let (la, lb) = (loops[i], loops[j]);
            for ei in 0..la.len() {
                let a1 = la[ei];
                let a2 = la[(ei + 1) % la.len()];
                for ej in 0..lb.len() {
                    let b1 = lb[ej];
                    let b2 = lb[(ej + 1) % lb.len()];
                    if let Some(p) = nfp::segment_intersection(a1, a2, b1, b2, eps) {
                        candidates.push(p);
                    }
                }
            }
        }
    }

    candidates.sort_by_key(|p| (OrderedFloat(p.0), OrderedFloat(p.1)));
    candidates.dedup_by(|a, b| a.distance(*b) < eps);
    candidates
}

/// Valid positions sit inside or on the inner-fit region and not strictly
/// inside any no-fit loop.
fn position_valid(ifp: &[Point], nfps: &[Vec<Point>], p: Point, eps: f64) -> bool {
    if nfp::point_in_polygon(ifp, p, eps) == Some(false) {
        return false;
    }
    nfps.iter()
        .all(|l| nfp::point_in_polygon(l, p, eps) != Some(true))
}

/// Length over which the translated part's edges run coincident with edges
/// of already placed parts (shared cuts).
fn merged_length_gain(placed: &[Polygon], rotated: &Polygon, t: Point, eps: f64) -> f64 {
    let part: Vec<Point> = rotated.points.iter().map(|p| *p + t).collect();
    let mut total = 0.0;
    for other in placed {
        let other_points = other.translated_points();
        for i in 0..part.len() {
            let a1 = part[i];
            let a2 = part[(i + 1) % part.len()];
            for j in 0..other_points.len() {
                let b1 = other_points[j];
                let b2 = other_points[(j + 1) % other_points.len()];
                total += nfp::coincident_length(a1, a2, b1, b2, eps);
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NestItem;
    use crate::ga::Gene;
    use float_cmp::approx_eq;

    fn worker_fixture(config: &NestConfig, part_sizes: &[(f64, f64)]) -> Vec<PartInstance> {
        let items: Vec<NestItem> = part_sizes
            .iter()
            .enumerate()
            .map(|(i, (w, h))| {
                let mut p = Polygon::rectangle(*w, *h);
                p.source = i;
                NestItem {
                    polygon: p,
                    quantity: 1,
                    is_sheet: false,
                }
            })
            .collect();
        PartInstance::expand(&items, config)
    }

    fn sheet(id: usize, source: usize, size: f64) -> Polygon {
        let mut s = Polygon::rectangle(size, size);
        s.id = id;
        s.source = source;
        s.sheet = true;
        s
    }

    fn identity_chromosome(instances: &[PartInstance]) -> Chromosome {
        Chromosome::new(
            instances
                .iter()
                .map(|i| Gene {
                    instance: i.id,
                    rotation: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn single_part_lands_bottom_left() {
        let config = NestConfig::default();
        let sheets = vec![sheet(0, 0, 20.0)];
        let instances = worker_fixture(&config, &[(5.0, 5.0)]);
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        assert_eq!(result.placed_count(), 1);
        assert!(result.unplaced.is_empty());
        let p = &result.layouts[0].placements[0];
        assert!(approx_eq!(f64, p.x, 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, p.y, 0.0, epsilon = 1e-9));
    }

    #[test]
    fn second_part_slides_alongside_the_first() {
        let mut config = NestConfig::default();
        config.rotations = 1;
        let sheets = vec![sheet(0, 0, 20.0)];
        let instances = worker_fixture(&config, &[(8.0, 8.0), (8.0, 8.0)]);
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        assert_eq!(result.placed_count(), 2);
        assert_eq!(result.layouts.len(), 1);
        let a = &result.layouts[0].placements[0];
        let b = &result.layouts[0].placements[1];
        // gravity: both on the sheet floor, second next to the first
        assert!(approx_eq!(f64, a.y, 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f64, b.y, 0.0, epsilon = 1e-6));
        assert!(approx_eq!(f64, (b.x - a.x).abs(), 8.0, epsilon = 1e-6));
        // the shared vertical edge counts as merged length
        assert!(approx_eq!(
            f64,
            result.merged_length,
            8.0,
            epsilon = 1e-6
        ));
    }

    #[test]
    fn oversized_part_is_recorded_unplaced() {
        let config = NestConfig::default();
        let sheets = vec![sheet(0, 0, 10.0)];
        let instances = worker_fixture(&config, &[(12.0, 12.0), (3.0, 3.0)]);
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        assert_eq!(result.unplaced, vec![0]);
        assert_eq!(result.placed_count(), 1);
        assert!(result.fitness.total >= fitness::UNPLACED_PENALTY);
    }

    #[test]
    fn tall_part_uses_a_fallback_rotation() {
        let mut config = NestConfig::default();
        config.rotations = 4;
        // sheet is wide and low; the part only fits rotated by 90 degrees
        let mut s = Polygon::rectangle(20.0, 6.0);
        s.sheet = true;
        let sheets = vec![s];
        let instances = worker_fixture(&config, &[(4.0, 15.0)]);
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        assert_eq!(result.placed_count(), 1);
        let p = &result.layouts[0].placements[0];
        assert!(p.rotation == 90.0 || p.rotation == 270.0);
    }

    #[test]
    fn priority_part_is_placed_first() {
        let mut config = NestConfig::default();
        config.rotations = 1;
        let sheets = vec![sheet(0, 0, 10.0)];
        let mut instances = worker_fixture(&config, &[(6.0, 6.0), (6.0, 6.0)]);
        // the second gene has priority, so it must land at the origin
        instances[1].priority = true;
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        let first = &result.layouts[0].placements[0];
        assert_eq!(first.id, 1);
        assert!(approx_eq!(f64, first.x, 0.0, epsilon = 1e-9));
    }

    #[test]
    fn overflow_opens_the_next_sheet() {
        let mut config = NestConfig::default();
        config.rotations = 1;
        let sheets = vec![sheet(0, 0, 10.0), sheet(1, 1, 10.0)];
        let instances = worker_fixture(&config, &[(7.0, 7.0), (7.0, 7.0)]);
        let worker = PlacementWorker::new(&config, &sheets, &instances);
        let result = worker.place(&identity_chromosome(&instances));
        assert_eq!(result.layouts.len(), 2);
        assert_eq!(result.placed_count(), 2);
        assert_eq!(result.layouts[1].sheet_id, 1);
    }
}
