use anyhow::anyhow;

/// Port for the activity-suggestion collaborator. The shipped
/// implementation is an offline template bank; a network-backed prompt
/// service plugs in behind the same trait. Failures are generic and never
/// touch the data store.
pub trait ActivitySuggester {
    fn suggest(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct TemplateSuggester;

impl ActivitySuggester for TemplateSuggester {
    fn suggest(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<String>> {
        let grade = grade.trim();
        let subject = subject.trim();
        if grade.is_empty() || subject.is_empty() {
            return Err(anyhow!("grade and subject are required"));
        }

        let templates: &[&str] = match subject {
            "Historia" | "Geografía" => &[
                "Línea de tiempo ilustrada sobre un periodo clave de {subject}",
                "Debate en equipos: dos posturas frente a un hecho histórico",
                "Entrevista imaginaria a un personaje de la época estudiada",
                "Mapa comentado de los lugares vistos en clase",
            ],
            "Matemáticas" => &[
                "Resolución de problemas por estaciones con dificultad creciente",
                "Juego de mesa matemático diseñado por los estudiantes",
                "Proyecto: medir y presupuestar un objeto real del aula",
            ],
            "Ciencias" => &[
                "Experimento guiado con registro de hipótesis y resultados",
                "Maqueta explicativa de un proceso natural",
                "Feria de mini-demostraciones entre compañeros",
            ],
            "Español" | "Inglés" => &[
                "Taller de escritura creativa a partir de una imagen",
                "Lectura dramatizada en pequeños grupos",
                "Producción de un podcast breve sobre el tema de la unidad",
            ],
            _ => &[
                "Exposición breve en parejas sobre un subtema de {subject}",
                "Proyecto de investigación corto con presentación al grupo",
                "Cuestionario colaborativo preparado por los propios estudiantes",
            ],
        };

        Ok(templates
            .iter()
            .map(|t| format!("{} (adaptada a {grade})", t.replace("{subject}", subject)))
            .collect())
    }
}
