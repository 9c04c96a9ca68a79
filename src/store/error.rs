//! Store errors

use thiserror::Error;

use super::workout::WorkoutId;

/// User-correctable problems with a save request. Nothing is mutated when one is returned.
/// Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Digite um nome para o treino!")]
    EmptyName,
    #[error("O nome deve ter pelo menos {min} caracteres!")]
    NameTooShort { min: usize },
    #[error("O nome deve ter no máximo {max} caracteres!")]
    NameTooLong { max: usize },
    #[error("Selecione pelo menos um exercício!")]
    EmptySelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Treino não encontrado! ({0})")]
    NotFound(WorkoutId),
}
