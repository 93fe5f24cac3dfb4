use log::debug;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Flower {
    pub x: f64,
    pub y: f64,
    pub has_pollen: bool,
    harvested_at_ms: Option<u64>,
}

impl Flower {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            has_pollen: true,
            harvested_at_ms: None,
        }
    }
}

/// Flowers scattered over the arena. A harvested flower grows new pollen
/// after `regrow_ms`.
#[derive(Debug, Clone)]
pub struct FlowerField {
    flowers: Vec<Flower>,
    regrow_ms: u64,
}

const MAX_PLACEMENT_ATTEMPTS: usize = 200;
const EDGE_MARGIN: f64 = 0.3;

impl FlowerField {
    pub fn new(flowers: Vec<Flower>, regrow_ms: u64) -> Self {
        Self { flowers, regrow_ms }
    }

    /// Places up to `count` flowers uniformly, at least `clearance` away
    /// from every point in `keep_out`.
    pub fn scatter<R: Rng>(
        rng: &mut R,
        count: usize,
        width: f64,
        height: f64,
        keep_out: &[(f64, f64)],
        clearance: f64,
        regrow_ms: u64,
    ) -> Self {
        let mut flowers = Vec::with_capacity(count);
        let mut attempts = 0;
        while flowers.len() < count && attempts < MAX_PLACEMENT_ATTEMPTS {
            attempts += 1;
            let x = rng.random_range(EDGE_MARGIN..width - EDGE_MARGIN);
            let y = rng.random_range(EDGE_MARGIN..height - EDGE_MARGIN);
            let clear = keep_out
                .iter()
                .all(|&(kx, ky)| (x - kx).hypot(y - ky) >= clearance);
            if clear {
                flowers.push(Flower::new(x, y));
            }
        }
        if flowers.len() < count {
            debug!("Sim: Only placed {} of {} flowers.", flowers.len(), count);
        }
        Self::new(flowers, regrow_ms)
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn with_pollen(&self) -> impl Iterator<Item = &Flower> {
        self.flowers.iter().filter(|f| f.has_pollen)
    }

    /// Takes the pollen from the closest flower accepted by `reachable`.
    pub fn harvest<F>(&mut self, now_ms: u64, reachable: F) -> bool
    where
        F: Fn(&Flower) -> Option<f64>,
    {
        let nearest = self
            .flowers
            .iter_mut()
            .filter(|f| f.has_pollen)
            .filter_map(|f| reachable(&*f).map(|d| (d, f)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((_, flower)) => {
                flower.has_pollen = false;
                flower.harvested_at_ms = Some(now_ms);
                true
            }
            None => false,
        }
    }

    pub fn regrow(&mut self, now_ms: u64) {
        for flower in &mut self.flowers {
            if let Some(harvested) = flower.harvested_at_ms {
                if now_ms.saturating_sub(harvested) >= self.regrow_ms {
                    flower.has_pollen = true;
                    flower.harvested_at_ms = None;
                }
            }
        }
    }
}
