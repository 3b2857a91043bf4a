//! SG-SST module catalog
//!
//! The seven management modules shown in the sidebar and the numbered
//! submodules under each one. The leading number of every submodule label
//! is the code used to locate its folder in a company tree.

use serde::Serialize;

/// Companies offered when no configuration exists yet
pub const DEFAULT_COMPANIES: &[&str] = &["Tempoactiva", "Temposum", "Aseplus", "Asel"];

#[derive(Debug, Serialize, Clone, Copy)]
pub struct Module {
    pub name: &'static str,
    pub submodules: &'static [&'static str],
}

pub const MODULES: &[Module] = &[
    Module {
        name: "Recursos",
        submodules: &[
            "1.1.1 Responsable del SG",
            "1.1.2 Roles y Responsabilidades",
            "1.1.3 Asignación de Recursos",
            "1.1.4 Afiliación al SSSI",
            "1.1.5 Trabajo de alto riesgo",
            "1.1.6 Conformación de Copasst",
            "1.1.7 Capacitación al Copasst",
            "1.1.8 Conformación de Comite de Convivencia",
            "1.2.1 Programa de capacitación Anual",
            "1.2.2 Inducción y Reinducción",
            "1.2.3 Curso Virtual 50 Horas",
            "1.2.4 Manual de SST para Proveedores y Contratistas",
        ],
    },
    Module {
        name: "Gestión Integral",
        submodules: &[
            "2.1.1 Politica del SG-SST",
            "2.2.1 Objetivos SST",
            "2.3.1 Evaluación inicial del SG-SST",
            "2.4.1 Plan de Trabajo Anual",
            "2.5.1 Archivo y retención documental del SG-SST",
            "2.6.1 Rendición de cuentas",
            "2.7.1 Matriz de requisitos legales",
            "2.8.1 Mecanismos de comunicaciones",
            "2.9.1 Identificación y evaluación para la adquisición de bienes y servicios",
            "2.10.1 Evaluación y seleción de proveedores y contratistas",
            "2.11.1 Gestión del Cambio",
            "2.12.1 Equipos y Herramientas",
            "2.13.1 Elementos de Protección Personal",
        ],
    },
    Module {
        name: "Gestión de la Salud",
        submodules: &[
            "3.1.1 Descripción Sociodemografica y diagnostico de condiciones de salud",
            "3.1.2 Actividades de medicina y preventiva y promoción de la salud",
            "3.1.3 Perfil de cargo y profesiograma",
            "3.1.4 Evaluaciones médicas",
            "3.1.5 Custodia medica ocupacional",
            "3.1.6 Restricciones y recomendaciones médicas",
            "3.1.7 Estilos de vida Saludables",
            "3.1.8 Servicios de Higiene",
            "3.1.9 Manejo de Residuos",
            "3.2.1 Reporte de los accidentes de trabajo",
            "3.2.2 Investigación de Accidentes, indicentes y Enfermedades",
            "3.2.3 Registro y analisis estadistico de indicentes, accidentes de trabajo y enfermedades",
            "3.3.1 Frecuencia de la accidentalidad",
            "3.3.2 Severidad de la accidentalidad",
            "3.3.3 Proporción de accidentes de trabajo mortales",
            "3.3.4 Medición de la prevalencia de enfermedades laborales",
            "3.3.5 Medición de la incidencia de enfermedades laborales",
            "3.3.6 Medición del ausentismo por causa médica",
        ],
    },
    Module {
        name: "Gestión de Peligros y Riesgos",
        submodules: &[
            "4.1.1 Metodologia IPEVR",
            "4.1.2 Identificación de Peligros",
            "4.1.3 Identificación de Sustancias Químicas carcinogénas o con toxicidad",
            "4.1.4 Mediciones ambientales",
            "4.2.1 Mediciones de Prevención y Control frente a Peligros, Riesgos Identificados",
            "4.2.2 Aplicación de las medidas de prevención y control por parte de los trabajadores",
            "4.2.3 Evaluación de procedimientos, instructivos internos de seguridad y salud en el trabajo",
            "4.2.4 Realización de inspecciones sistematicas a las instalaciones, maquinas o equipos",
            "4.2.5 Mantenimiento periodico de equipos, instalaciones herramientas",
            "4.2.6 Entrega de EPP",
        ],
    },
    Module {
        name: "Gestión de Amenazas",
        submodules: &[
            "5.1.1 Plan de Prevención de Emergencias",
            "5.1.2 Examenes Medicos Brigadista",
        ],
    },
    Module {
        name: "Verificación",
        submodules: &[
            "6.1.1 Definición de indicadores",
            "6.1.2 Auditoria Anual",
            "6.1.3 Revisión de la alta Dirección",
            "6.1.4 Planificación de la Auditoria",
        ],
    },
    Module {
        name: "Mejoramiento",
        submodules: &[
            "7.1.1 Acciones Preventivas y Correctivas",
            "7.1.2 Acciones de Mejora conforme a revisiones de la alta gerencia",
            "7.1.3 Acciones de Mejora con base en investigaciones de AT y EL",
            "7.1.4 Elaboración de Planes de Mejoramiento de medidas y acciones correctivas por autoridades y ARL",
        ],
    },
];

/// Submodule labels of a module, `None` for an unknown module
pub fn submodules(module: &str) -> Option<&'static [&'static str]> {
    MODULES
        .iter()
        .find(|m| m.name == module)
        .map(|m| m.submodules)
}

/// Find the module owning a submodule label
pub fn find_submodule(label: &str) -> Option<(&'static str, &'static str)> {
    MODULES.iter().find_map(|m| {
        m.submodules
            .iter()
            .find(|s| **s == label)
            .map(|s| (m.name, *s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::extract_code;

    #[test]
    fn test_every_submodule_has_a_code() {
        for module in MODULES {
            for label in module.submodules {
                assert!(extract_code(label).is_some(), "no code in {}", label);
            }
        }
    }

    #[test]
    fn test_lookups() {
        let amenazas = submodules("Gestión de Amenazas").unwrap();
        assert_eq!(amenazas.len(), 2);
        assert!(amenazas.iter().all(|s| s.starts_with("5.1.")));
        assert!(submodules("Salir").is_none());
        assert!(find_submodule("Salir").is_none());
        assert_eq!(
            find_submodule("3.1.4 Evaluaciones médicas"),
            Some(("Gestión de la Salud", "3.1.4 Evaluaciones médicas"))
        );
    }
}
