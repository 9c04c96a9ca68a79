//! Exercise catalog - static exercise database grouped by muscle category

use serde::{Deserialize, Serialize};

/// Rest used by the timer when the rest text carries no number
pub const DEFAULT_REST_SECS: u32 = 60;

/// Catalog categories, serialized with the ids the stored blobs use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Peito,
    Costas,
    Pernas,
    Ombros,
    Biceps,
    Posteriores,
    Punho,
    Triceps,
}

impl Category {
    pub fn id(&self) -> &'static str {
        match self {
            Category::Peito => "peito",
            Category::Costas => "costas",
            Category::Pernas => "pernas",
            Category::Ombros => "ombros",
            Category::Biceps => "biceps",
            Category::Posteriores => "posteriores",
            Category::Punho => "punho",
            Category::Triceps => "triceps",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Peito => "Peito",
            Category::Costas => "Costas",
            Category::Pernas => "Pernas",
            Category::Ombros => "Ombros",
            Category::Biceps => "Bíceps",
            Category::Posteriores => "Posteriores",
            Category::Punho => "Punho",
            Category::Triceps => "Tríceps",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[
            Category::Peito,
            Category::Costas,
            Category::Pernas,
            Category::Ombros,
            Category::Biceps,
            Category::Posteriores,
            Category::Punho,
            Category::Triceps,
        ]
    }

    pub fn from_id(id: &str) -> Option<Category> {
        Category::all().iter().copied().find(|c| c.id() == id)
    }
}

/// Category tag used when browsing ("todos" shows everything)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn parse(id: &str) -> Option<Self> {
        if id.eq_ignore_ascii_case("todos") {
            return Some(CategoryFilter::All);
        }
        Category::from_id(&id.to_lowercase()).map(CategoryFilter::Only)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Todos",
            CategoryFilter::Only(c) => c.label(),
        }
    }
}

/// Compiled-in catalog entry
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub muscle: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub sets: &'static str,
    pub rest: &'static str,
    pub intensity: &'static str,
    pub icon: &'static str,
    pub category: Category,
}

impl CatalogEntry {
    /// Owned copy of the entry, ready to be stored in a workout
    pub fn snapshot(&self) -> Exercise {
        Exercise {
            id: self.id.to_string(),
            name: self.name.to_string(),
            muscle_group: self.muscle.to_string(),
            description: self.description.to_string(),
            image_ref: self.image.to_string(),
            sets_scheme: self.sets.to_string(),
            rest_spec: self.rest.to_string(),
            rest_seconds: parse_rest_seconds(self.rest),
            intensity: self.intensity.to_string(),
            icon_ref: self.icon.to_string(),
            category: self.category,
        }
    }
}

/// Exercise snapshot as kept in selections, workouts and favorites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExerciseRecord")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "muscle")]
    pub muscle_group: String,
    pub description: String,
    #[serde(rename = "image")]
    pub image_ref: String,
    #[serde(rename = "sets")]
    pub sets_scheme: String,
    #[serde(rename = "rest")]
    pub rest_spec: String,
    #[serde(rename = "restSeconds")]
    pub rest_seconds: u32,
    pub intensity: String,
    #[serde(rename = "icon")]
    pub icon_ref: String,
    pub category: Category,
}

/// Stored shape; blobs written before `restSeconds` existed lack the field
#[derive(Deserialize)]
struct ExerciseRecord {
    id: String,
    name: String,
    #[serde(default)]
    muscle: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    sets: String,
    #[serde(default)]
    rest: String,
    #[serde(rename = "restSeconds")]
    rest_seconds: Option<u32>,
    #[serde(default)]
    intensity: String,
    #[serde(default)]
    icon: String,
    category: Category,
}

impl From<ExerciseRecord> for Exercise {
    fn from(r: ExerciseRecord) -> Self {
        let rest_seconds = r.rest_seconds.unwrap_or_else(|| parse_rest_seconds(&r.rest));
        Exercise {
            id: r.id,
            name: r.name,
            muscle_group: r.muscle,
            description: r.description,
            image_ref: r.image,
            sets_scheme: r.sets,
            rest_spec: r.rest,
            rest_seconds,
            intensity: r.intensity,
            icon_ref: r.icon,
            category: r.category,
        }
    }
}

/// First integer in a rest text ("60-90s" -> 60)
pub fn parse_rest_seconds(rest: &str) -> u32 {
    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT_REST_SECS)
}

pub const CATALOG: &[CatalogEntry] = &[
    // Peito
    CatalogEntry {
        id: "supino-reto",
        name: "Supino Reto",
        muscle: "Peito",
        description: "Deitado no banco com os pés apoiados no chão, segure a barra um pouco mais aberta que os ombros, desça até o peito e empurre até estender os braços.",
        image: "peito/supino-reto.gif",
        sets: "4x8-10",
        rest: "60-90s",
        intensity: "Média-Alta",
        icon: "fas fa-user",
        category: Category::Peito,
    },
    CatalogEntry {
        id: "supino-inclinado",
        name: "Supino Inclinado",
        muscle: "Peito Superior",
        description: "No banco inclinado, desça a barra até o peito superior e empurre para cima.",
        image: "peito/supino-inclinado.gif",
        sets: "4x8-12",
        rest: "90s",
        intensity: "Média",
        icon: "fas fa-arrow-up",
        category: Category::Peito,
    },
    CatalogEntry {
        id: "crucifixo",
        name: "Crucifixo com Halteres",
        muscle: "Peito",
        description: "Deitado, abra os braços com leve flexão nos cotovelos e feche em arco sobre o peito.",
        image: "/assets/gif/crucifixo.gif",
        sets: "3x12",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-expand",
        category: Category::Peito,
    },
    // Costas
    CatalogEntry {
        id: "puxada-frente",
        name: "Puxada Frente",
        muscle: "Costas",
        description: "Sentado na polia alta, puxe a barra até a parte superior do peito mantendo o tronco firme.",
        image: "costas/puxada-frente.gif",
        sets: "4x10",
        rest: "60-90s",
        intensity: "Média",
        icon: "fas fa-arrow-down",
        category: Category::Costas,
    },
    CatalogEntry {
        id: "remada-curvada",
        name: "Remada Curvada",
        muscle: "Costas",
        description: "Com o tronco inclinado e coluna neutra, puxe a barra em direção ao abdômen.",
        image: "costas/Remada Curvada.gif",
        sets: "4x8-10",
        rest: "90s",
        intensity: "Alta",
        icon: "fas fa-grip-lines",
        category: Category::Costas,
    },
    // Pernas
    CatalogEntry {
        id: "agachamento",
        name: "Agachamento Livre",
        muscle: "Quadríceps",
        description: "Com a barra nas costas, desça até as coxas ficarem paralelas ao chão e suba empurrando pelos calcanhares.",
        image: "pernas/agachamento",
        sets: "4x8",
        rest: "120s",
        intensity: "Alta",
        icon: "fas fa-shoe-prints",
        category: Category::Pernas,
    },
    CatalogEntry {
        id: "leg-press",
        name: "Leg Press 45",
        muscle: "Quadríceps",
        description: "Empurre a plataforma até quase estender os joelhos e retorne controlando o peso.",
        image: "pernas//leg-press.gif",
        sets: "4x10-12",
        rest: "90s",
        intensity: "Média-Alta",
        icon: "fas fa-weight-hanging",
        category: Category::Pernas,
    },
    // Ombros
    CatalogEntry {
        id: "desenvolvimento",
        name: "Desenvolvimento com Halteres",
        muscle: "Ombros",
        description: "Sentado, empurre os halteres acima da cabeça até estender os braços.",
        image: "ombros/desenvolvimento.gif",
        sets: "4x10",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-arrows-alt-v",
        category: Category::Ombros,
    },
    CatalogEntry {
        id: "elevacao-lateral",
        name: "Elevação Lateral",
        muscle: "Deltoide Lateral",
        description: "Eleve os halteres lateralmente até a altura dos ombros.",
        image: "ombros/elevacao%20lateral.gif",
        sets: "3x12-15",
        rest: "45s",
        intensity: "Baixa-Média",
        icon: "fas fa-arrows-alt-h",
        category: Category::Ombros,
    },
    // Bíceps
    CatalogEntry {
        id: "rosca-direta",
        name: "Rosca Direta",
        muscle: "Bíceps",
        description: "Em pé, flexione os cotovelos levando a barra até os ombros sem balançar o tronco.",
        image: "biceps/rosca-direta.gif",
        sets: "3x10-12",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-dumbbell",
        category: Category::Biceps,
    },
    CatalogEntry {
        id: "rosca-martelo",
        name: "Rosca Martelo",
        muscle: "Braquial",
        description: "Com pegada neutra, flexione os cotovelos alternando os braços.",
        image: "biceps/rosca-martelo.gif",
        sets: "3x12",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-hammer",
        category: Category::Biceps,
    },
    // Posteriores
    CatalogEntry {
        id: "stiff",
        name: "Stiff",
        muscle: "Posteriores de Coxa",
        description: "Com joelhos levemente flexionados, desça a barra rente às pernas mantendo a coluna neutra.",
        image: "posteriores/stiff.gif",
        sets: "4x10",
        rest: "90s",
        intensity: "Média-Alta",
        icon: "fas fa-level-down-alt",
        category: Category::Posteriores,
    },
    CatalogEntry {
        id: "mesa-flexora",
        name: "Mesa Flexora",
        muscle: "Posteriores de Coxa",
        description: "Deitado na máquina, flexione os joelhos trazendo o apoio em direção aos glúteos.",
        image: "posteriores/mesa-flexora.gif",
        sets: "3x12",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-redo",
        category: Category::Posteriores,
    },
    // Punho
    CatalogEntry {
        id: "rosca-punho",
        name: "Rosca de Punho",
        muscle: "Antebraço",
        description: "Com os antebraços apoiados, flexione os punhos segurando a barra.",
        image: "punho/rosca-punho.gif",
        sets: "3x15",
        rest: "45s",
        intensity: "Baixa",
        icon: "fas fa-hand-rock",
        category: Category::Punho,
    },
    // Tríceps
    CatalogEntry {
        id: "triceps-pulley",
        name: "Tríceps Pulley",
        muscle: "Tríceps",
        description: "Na polia alta, estenda os cotovelos empurrando a barra para baixo com os braços colados ao corpo.",
        image: "triceps/triceps-pulley.gif",
        sets: "4x10-12",
        rest: "60s",
        intensity: "Média",
        icon: "fas fa-angle-double-down",
        category: Category::Triceps,
    },
    CatalogEntry {
        id: "triceps-frances",
        name: "Tríceps Francês",
        muscle: "Tríceps",
        description: "Segure o halter atrás da cabeça e estenda os cotovelos até os braços ficarem retos.",
        image: "triceps/triceps-frances.gif",
        sets: "3x10",
        rest: "livre",
        intensity: "Média",
        icon: "fas fa-user-alt",
        category: Category::Triceps,
    },
];

/// Read-only exercise database built once at startup
#[derive(Debug, Clone)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// Build the catalog from the compiled-in entries
    pub fn load() -> Self {
        Self::from_entries(CATALOG)
    }

    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        Self {
            exercises: entries.iter().map(CatalogEntry::snapshot).collect(),
        }
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn by_category(&self, category: Category) -> Vec<&Exercise> {
        self.exercises.iter().filter(|e| e.category == category).collect()
    }

    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Exercise> {
        match filter {
            CategoryFilter::All => self.exercises.iter().collect(),
            CategoryFilter::Only(category) => self.by_category(category),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_rest_range() {
        assert_eq!(parse_rest_seconds("60-90s"), 60);
    }

    #[test]
    fn test_parse_rest_plain() {
        assert_eq!(parse_rest_seconds("90s"), 90);
        assert_eq!(parse_rest_seconds("descanso 45s"), 45);
    }

    #[test]
    fn test_parse_rest_without_number() {
        assert_eq!(parse_rest_seconds("livre"), DEFAULT_REST_SECS);
        assert_eq!(parse_rest_seconds(""), DEFAULT_REST_SECS);
    }

    #[test]
    fn test_catalog_ids_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn test_every_category_has_exercises() {
        let catalog = Catalog::load();
        for category in Category::all() {
            assert!(!catalog.by_category(*category).is_empty(), "{:?} is empty", category);
        }
    }

    #[test]
    fn test_filter_all_returns_everything() {
        let catalog = Catalog::load();
        assert_eq!(catalog.filter(CategoryFilter::All).len(), catalog.len());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(CategoryFilter::parse("todos"), Some(CategoryFilter::All));
        assert_eq!(CategoryFilter::parse("Peito"), Some(CategoryFilter::Only(Category::Peito)));
        assert_eq!(CategoryFilter::parse("cardio"), None);
    }

    #[test]
    fn test_snapshot_derives_rest_seconds() {
        let catalog = Catalog::load();
        let supino = catalog.find("supino-reto").unwrap();
        assert_eq!(supino.rest_seconds, 60);
        assert_eq!(supino.rest_spec, "60-90s");
    }

    #[test]
    fn test_deserialize_legacy_record_without_rest_seconds() {
        let json = r#"{
            "id": "supino-reto",
            "name": "Supino Reto",
            "muscle": "Peito",
            "description": "",
            "image": "/assets/gif/supino-reto.gif",
            "sets": "4x8-10",
            "rest": "90s",
            "intensity": "Média",
            "icon": "fas fa-user",
            "category": "peito"
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.rest_seconds, 90);
        assert_eq!(exercise.muscle_group, "Peito");
        assert_eq!(exercise.category, Category::Peito);
    }

    #[test]
    fn test_serialize_uses_stored_field_names() {
        let catalog = Catalog::load();
        let value = serde_json::to_value(catalog.find("stiff").unwrap()).unwrap();
        assert_eq!(value["muscle"], "Posteriores de Coxa");
        assert_eq!(value["restSeconds"], 90);
        assert_eq!(value["category"], "posteriores");
    }
}
