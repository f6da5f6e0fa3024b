//! Terrain authoring: stamp terrain over rectangles and seed their contents.

use rand::Rng;

use super::{Grid, Terrain};
use crate::components::{Position, Region, ResourceKind};

/// Undead spawned in every cell of an infested region
pub const UNDEAD_PER_INFESTED_CELL: usize = 4;

pub const LAKE_WATER: u32 = 50;
pub const RIVER_WATER: u32 = 30;
pub const FOREST_WOOD: u32 = 40;
pub const MINE_ORE: u32 = 30;

impl Grid {
    /// Set terrain over a region clamped to the board; returns the cells touched
    fn mark_region(&mut self, region: Region, terrain: Terrain) -> Vec<Position> {
        let cells: Vec<Position> = region.clamped_cells(self.width, self.height).collect();
        for pos in &cells {
            if let Some(cell) = self.cell_mut(*pos) {
                cell.terrain = terrain;
            }
        }
        cells
    }

    fn mark_resource_region(
        &mut self,
        region: Region,
        terrain: Terrain,
        kind: ResourceKind,
        quantity: u32,
    ) {
        for pos in self.mark_region(region, terrain) {
            self.spawn_resource(kind, quantity, pos);
        }
    }

    pub fn mark_settlement_region(&mut self, region: Region) {
        self.mark_region(region, Terrain::Settlement);
    }

    pub fn mark_field_region(&mut self, region: Region) {
        self.mark_region(region, Terrain::Field);
    }

    /// Infested zones come pre-populated with random undead
    pub fn mark_infested_region(&mut self, region: Region, rng: &mut impl Rng) {
        for pos in self.mark_region(region, Terrain::Infested) {
            for _ in 0..UNDEAD_PER_INFESTED_CELL {
                self.spawn_random_undead(pos, rng);
            }
        }
    }

    pub fn mark_lake_region(&mut self, region: Region) {
        self.mark_resource_region(region, Terrain::Lake, ResourceKind::Water, LAKE_WATER);
    }

    pub fn mark_river_region(&mut self, region: Region) {
        self.mark_resource_region(region, Terrain::River, ResourceKind::Water, RIVER_WATER);
    }

    pub fn mark_forest_region(&mut self, region: Region) {
        self.mark_resource_region(region, Terrain::Forest, ResourceKind::Wood, FOREST_WOOD);
    }

    pub fn mark_mine_region(&mut self, region: Region) {
        self.mark_resource_region(region, Terrain::Mine, ResourceKind::Ore, MINE_ORE);
    }

    /// One line per row of terrain symbols, top row first
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize * 2 + 1) * self.height as usize);
        for y in 0..self.height as i32 {
            let row: Vec<String> = (0..self.width as i32)
                .map(|x| {
                    self.terrain_at(Position::new(x, y))
                        .map(|t| t.symbol())
                        .unwrap_or('?')
                        .to_string()
                })
                .collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Resource, Role};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lake_seeds_water_per_cell() {
        let mut grid = Grid::new(10, 10);
        grid.mark_lake_region(Region::new(1, 1, 2, 3));

        assert_eq!(grid.resources().len(), 6);
        for &entity in grid.resources() {
            let res = *grid.world.get::<&Resource>(entity).unwrap();
            assert_eq!(res.kind, ResourceKind::Water);
            assert_eq!(res.quantity, LAKE_WATER);
        }
        assert_eq!(grid.terrain_at(Position::new(2, 3)), Some(Terrain::Lake));
        assert_eq!(grid.terrain_at(Position::new(3, 3)), Some(Terrain::Field));
    }

    #[test]
    fn test_region_is_clamped() {
        let mut grid = Grid::new(4, 4);
        grid.mark_mine_region(Region::new(3, 3, 10, 10));
        assert_eq!(grid.resources().len(), 1);
        assert_eq!(grid.terrain_at(Position::new(3, 3)), Some(Terrain::Mine));
    }

    #[test]
    fn test_infested_region_spawns_undead() {
        let mut grid = Grid::new(6, 6);
        let mut rng = StdRng::seed_from_u64(3);
        grid.mark_infested_region(Region::new(0, 0, 2, 2), &mut rng);

        assert_eq!(grid.roster().len(), 4 * UNDEAD_PER_INFESTED_CELL);
        assert_eq!(grid.count_roles(Role::is_undead), grid.roster().len());
        assert_eq!(grid.entities_at(Position::new(1, 1)).len(), UNDEAD_PER_INFESTED_CELL);
        assert!(grid.audit().is_empty());
    }

    #[test]
    fn test_field_overrides_settlement() {
        let mut grid = Grid::new(4, 4);
        grid.mark_settlement_region(Region::new(0, 0, 4, 4));
        grid.mark_field_region(Region::new(0, 0, 1, 4));
        assert_eq!(grid.terrain_at(Position::new(0, 2)), Some(Terrain::Field));
        assert_eq!(grid.terrain_at(Position::new(1, 2)), Some(Terrain::Settlement));
    }

    #[test]
    fn test_render_ascii() {
        let mut grid = Grid::new(3, 2);
        grid.mark_forest_region(Region::new(0, 0, 1, 1));
        grid.mark_river_region(Region::new(2, 1, 1, 1));
        assert_eq!(grid.render_ascii(), "B F F\nF F R\n");
    }

    #[test]
    fn test_terrain_names() {
        let mut grid = Grid::new(2, 1);
        grid.mark_infested_region(Region::new(1, 0, 1, 1), &mut StdRng::seed_from_u64(0));
        let names: Vec<&str> = (0..2)
            .filter_map(|x| grid.terrain_at(Position::new(x, 0)))
            .map(|t| t.name())
            .collect();
        assert_eq!(names, vec!["Open field", "Infested zone"]);
    }
}
