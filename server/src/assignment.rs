//! Role and disease assignment
//!
//! Splits the players of a room into three role buckets. Bucket sizes depend
//! only on the player count; bucket membership comes from a uniform shuffle.
//! One main and one differential disease are drawn for the whole room.

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Disease, DiseaseKind, PlayerId, Role};

/// Sizes of the three role buckets for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBuckets {
    pub main: usize,
    pub differential: usize,
    pub doctor_grey: usize,
}

impl RoleBuckets {
    /// 60% main, 30% differential, remainder Doctor Grey. The first two
    /// buckets hold at least one player each.
    pub fn for_players(count: usize) -> Self {
        let main = (count * 6 / 10).max(1);
        let differential = (count * 3 / 10).max(1);
        let doctor_grey = count.saturating_sub(main + differential);

        Self {
            main,
            differential,
            doctor_grey,
        }
    }

    pub fn total(&self) -> usize {
        self.main + self.differential + self.doctor_grey
    }
}

/// The role drawn for a single player
#[derive(Debug, Clone, PartialEq)]
pub struct RoleCard {
    pub player_id: PlayerId,
    pub role: Role,
    pub disease: Option<String>,
}

/// Complete assignment for a room
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub cards: Vec<RoleCard>,
    pub main_disease: Disease,
    pub differential_disease: Disease,
}

impl Assignment {
    pub fn card_for(&self, player_id: PlayerId) -> Option<&RoleCard> {
        self.cards.iter().find(|c| c.player_id == player_id)
    }

    pub fn count(&self, role: Role) -> usize {
        self.cards.iter().filter(|c| c.role == role).count()
    }
}

/// Deals roles to `players`. Returns None if the catalog lacks a main or a
/// differential disease, or there are fewer than two players.
pub fn assign_roles<R: Rng + ?Sized>(
    players: &[PlayerId],
    catalog: &[Disease],
    rng: &mut R,
) -> Option<Assignment> {
    if players.len() < 2 {
        return None;
    }

    let mains: Vec<&Disease> = catalog
        .iter()
        .filter(|d| d.kind == DiseaseKind::Main)
        .collect();
    let differentials: Vec<&Disease> = catalog
        .iter()
        .filter(|d| d.kind == DiseaseKind::Differential)
        .collect();

    let main_disease = (*mains.choose(rng)?).clone();
    let differential_disease = (*differentials.choose(rng)?).clone();

    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);

    let buckets = RoleBuckets::for_players(players.len());
    let cards = shuffled
        .into_iter()
        .enumerate()
        .map(|(i, player_id)| {
            if i < buckets.main {
                RoleCard {
                    player_id,
                    role: Role::MainDiagnose,
                    disease: Some(main_disease.name.clone()),
                }
            } else if i < buckets.main + buckets.differential {
                RoleCard {
                    player_id,
                    role: Role::DifferentialDiagnose,
                    disease: Some(differential_disease.name.clone()),
                }
            } else {
                RoleCard {
                    player_id,
                    role: Role::DoctorGrey,
                    disease: None,
                }
            }
        })
        .collect();

    Some(Assignment {
        cards,
        main_disease,
        differential_disease,
    })
}

fn disease(id: &str, name: &str, kind: DiseaseKind, description: &str, symptoms: &[&str]) -> Disease {
    Disease {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        description: description.to_string(),
        symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
    }
}

/// The static disease catalog used by every room
pub fn default_catalog() -> Vec<Disease> {
    vec![
        disease(
            "1",
            "Tuberculosis",
            DiseaseKind::Main,
            "Bacterial infection affecting lungs",
            &["persistent cough", "chest pain", "fatigue", "weight loss"],
        ),
        disease(
            "2",
            "Pneumonia",
            DiseaseKind::Differential,
            "Lung infection causing inflammation",
            &["cough with phlegm", "fever", "difficulty breathing", "chest pain"],
        ),
        disease(
            "3",
            "Diabetes Type 2",
            DiseaseKind::Main,
            "Metabolic disorder with high blood sugar",
            &["increased thirst", "frequent urination", "fatigue", "blurred vision"],
        ),
        disease(
            "4",
            "Hypothyroidism",
            DiseaseKind::Differential,
            "Underactive thyroid gland",
            &["fatigue", "weight gain", "cold sensitivity", "dry skin"],
        ),
        disease(
            "5",
            "Hypertension",
            DiseaseKind::Main,
            "High blood pressure condition",
            &["headaches", "dizziness", "chest pain", "shortness of breath"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bucket_sizes() {
        assert_eq!(
            RoleBuckets::for_players(4),
            RoleBuckets {
                main: 2,
                differential: 1,
                doctor_grey: 1
            }
        );
        assert_eq!(
            RoleBuckets::for_players(10),
            RoleBuckets {
                main: 6,
                differential: 3,
                doctor_grey: 1
            }
        );
        assert_eq!(
            RoleBuckets::for_players(2),
            RoleBuckets {
                main: 1,
                differential: 1,
                doctor_grey: 0
            }
        );
    }

    #[test]
    fn test_buckets_always_cover_every_player() {
        for n in 2..=12 {
            let buckets = RoleBuckets::for_players(n);
            assert_eq!(buckets.total(), n, "bucket sum for {} players", n);
            assert!(buckets.main >= 1);
            assert!(buckets.differential >= 1);
        }
    }

    #[test]
    fn test_four_player_assignment() {
        let mut rng = StdRng::seed_from_u64(7);
        let assignment = assign_roles(&[1, 2, 3, 4], &default_catalog(), &mut rng).unwrap();

        assert_eq!(assignment.cards.len(), 4);
        assert!(assignment.count(Role::MainDiagnose) >= 1);
        assert!(assignment.count(Role::DifferentialDiagnose) >= 1);
        for id in 1..=4 {
            assert!(assignment.card_for(id).is_some());
        }
    }

    #[test]
    fn test_diseases_shared_per_bucket() {
        let mut rng = StdRng::seed_from_u64(3);
        let players: Vec<PlayerId> = (1..=12).collect();
        let assignment = assign_roles(&players, &default_catalog(), &mut rng).unwrap();

        assert_eq!(assignment.main_disease.kind, DiseaseKind::Main);
        assert_eq!(assignment.differential_disease.kind, DiseaseKind::Differential);

        for card in &assignment.cards {
            match card.role {
                Role::MainDiagnose => {
                    assert_eq!(card.disease.as_deref(), Some(assignment.main_disease.name.as_str()))
                }
                Role::DifferentialDiagnose => assert_eq!(
                    card.disease.as_deref(),
                    Some(assignment.differential_disease.name.as_str())
                ),
                Role::DoctorGrey => assert!(card.disease.is_none()),
            }
        }
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let players: Vec<PlayerId> = (1..=8).collect();
        let a = assign_roles(&players, &default_catalog(), &mut StdRng::seed_from_u64(11));
        let b = assign_roles(&players, &default_catalog(), &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_incomplete_catalog() {
        let mains_only: Vec<Disease> = default_catalog()
            .into_iter()
            .filter(|d| d.kind == DiseaseKind::Main)
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_roles(&[1, 2, 3, 4], &mains_only, &mut rng).is_none());
        assert!(assign_roles(&[1], &default_catalog(), &mut rng).is_none());
    }
}
