use crate::entities::Polygon;

/// One distinct shape to be nested, grouped by source, with the number of
/// instances wanted. Rebuilt from the inventory at the start of every
/// iteration; `quantity` already includes the configured multiplier.
#[derive(Clone, Debug)]
pub struct NestItem {
    pub polygon: Polygon,
    pub quantity: usize,
    pub is_sheet: bool,
}

impl NestItem {
    /// Groups an inventory of polygon clones by source, keeping the first
    /// clone of each source as the representative.
    pub fn group_by_source(polygons: &[Polygon], is_sheet: bool, multiplier: usize) -> Vec<NestItem> {
        let mut items: Vec<NestItem> = Vec::new();
        for p in polygons {
            match items.iter_mut().find(|it| it.polygon.source == p.source) {
                Some(it) => it.quantity += multiplier,
                None => items.push(NestItem {
                    polygon: p.clone(),
                    quantity: multiplier,
                    is_sheet,
                }),
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_sums_quantities_per_source() {
        let mut a = Polygon::rectangle(1.0, 1.0);
        a.source = 7;
        let mut b = Polygon::rectangle(2.0, 2.0);
        b.source = 9;
        let inventory = vec![a.clone(), b, a];
        let items = NestItem::group_by_source(&inventory, false, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[1].quantity, 2);
    }
}
