// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reclassification of dangling walls as barricades.

use crate::element::{Barricade, BuildingElement};
use crate::incidence::Incidence;

/// Turn every wall with an endpoint shared by no other element into a barricade.
///
/// Incidence is counted once over the whole set before any element changes, so
/// reclassification never cascades. Gates and barricades pass through.
pub fn reclassify_barricades(elements: Vec<BuildingElement>) -> Vec<BuildingElement> {
    let incidence = Incidence::from_elements(&elements);

    elements
        .into_iter()
        .map(|element| match element {
            BuildingElement::Wall(wall)
                if incidence.count(&wall.edge.start_vertex) < 2
                    || incidence.count(&wall.edge.end_vertex) < 2 =>
            {
                BuildingElement::Barricade(Barricade { edge: wall.edge })
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Edge, ElementKind, Gate, Wall};
    use crowdplan_geometry::Point2D;

    fn wall(a: (f64, f64), b: (f64, f64)) -> BuildingElement {
        Wall::new(a.into(), b.into()).into()
    }

    fn kinds(elements: &[BuildingElement]) -> Vec<ElementKind> {
        elements.iter().map(BuildingElement::kind).collect()
    }

    #[test]
    fn test_isolated_wall_becomes_barricade() {
        let result = reclassify_barricades(vec![wall((0.0, 0.0), (10.0, 0.0))]);
        assert_eq!(kinds(&result), vec![ElementKind::Barricade]);
        assert_eq!(result[0].start(), Point2D::new(0.0, 0.0));
        assert_eq!(result[0].end(), Point2D::new(10.0, 0.0));
    }

    #[test]
    fn test_corner_with_open_ends() {
        // Both walls are open at their far end
        let result = reclassify_barricades(vec![
            wall((0.0, 0.0), (10.0, 0.0)),
            wall((10.0, 0.0), (10.0, 10.0)),
        ]);
        assert_eq!(kinds(&result), vec![ElementKind::Barricade, ElementKind::Barricade]);
    }

    #[test]
    fn test_shared_corner_keeps_walls_when_far_ends_are_joined() {
        let result = reclassify_barricades(vec![
            wall((0.0, 0.0), (10.0, 0.0)),
            wall((10.0, 0.0), (10.0, 10.0)),
            wall((10.0, 10.0), (0.0, 0.0)),
        ]);
        assert_eq!(kinds(&result), vec![ElementKind::Wall; 3]);
    }

    #[test]
    fn test_closed_room_stays_walls() {
        let result = reclassify_barricades(vec![
            wall((0.0, 0.0), (10.0, 0.0)),
            wall((10.0, 0.0), (10.0, 10.0)),
            wall((10.0, 10.0), (0.0, 10.0)),
            wall((0.0, 10.0), (0.0, 0.0)),
        ]);
        assert!(result.iter().all(|e| e.kind() == ElementKind::Wall));
    }

    #[test]
    fn test_gate_counts_as_peer_but_is_not_reclassified() {
        let gate: BuildingElement = Gate {
            edge: Edge::new(Point2D::new(4.0, 0.0), Point2D::new(6.0, 0.0)),
        }
        .into();
        let result = reclassify_barricades(vec![
            wall((0.0, 0.0), (4.0, 0.0)),
            gate,
            wall((6.0, 0.0), (10.0, 0.0)),
            wall((10.0, 0.0), (0.0, 0.0)),
        ]);
        assert_eq!(
            kinds(&result),
            vec![ElementKind::Wall, ElementKind::Gate, ElementKind::Wall, ElementKind::Wall]
        );
    }
}
