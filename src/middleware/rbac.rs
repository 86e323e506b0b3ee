// src/middleware/rbac.rs

use crate::{common::error::AppError, models::auth::{User, UserRole}};

// ---
// GRUPOS DE PAPÉIS
// ---

pub const LAB_ADMIN_ONLY: &[UserRole] = &[UserRole::LabAdmin];

// "Equipe do laboratório": admin ou staff
pub const LAB_STAFF: &[UserRole] = &[UserRole::LabAdmin, UserRole::LabStaff];

// A equipe toda, incluindo o courier (rotas de coleta)
pub const LAB_TEAM: &[UserRole] = &[UserRole::LabAdmin, UserRole::LabStaff, UserRole::LabCourier];

pub const HOSPITAL_ONLY: &[UserRole] = &[UserRole::HospitalUser];

// ---
// A verificação de autorização
// ---
// Recebe o usuário e os papéis exigidos como parâmetros comuns,
// sem guardião implícito na rota.
pub fn require_role(user: &User, allowed: &[UserRole]) -> Result<(), AppError> {
    if !user.is_active {
        return Err(AppError::Forbidden("Conta de usuário desativada."));
    }
    if !allowed.contains(&user.role) {
        return Err(AppError::Forbidden(
            "Você não tem permissão para realizar esta ação.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: UserRole, is_active: bool) -> User {
        User {
            id: 1,
            name: "Teste".to_string(),
            email: "teste@exemplo.com".to_string(),
            phone: None,
            password_hash: "hash".to_string(),
            role,
            lab_id: Some(1),
            hospital_id: None,
            is_active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn allows_user_with_a_listed_role() {
        let user = user_with_role(UserRole::LabStaff, true);
        assert!(require_role(&user, LAB_STAFF).is_ok());
        assert!(require_role(&user, LAB_TEAM).is_ok());
    }

    #[test]
    fn rejects_role_outside_the_list() {
        let user = user_with_role(UserRole::HospitalUser, true);
        assert!(matches!(
            require_role(&user, LAB_STAFF),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn rejects_deactivated_user_even_with_the_right_role() {
        let user = user_with_role(UserRole::LabAdmin, false);
        assert!(matches!(
            require_role(&user, LAB_ADMIN_ONLY),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn courier_belongs_to_the_team_but_not_to_staff() {
        let courier = user_with_role(UserRole::LabCourier, true);
        assert!(require_role(&courier, LAB_TEAM).is_ok());
        assert!(require_role(&courier, LAB_STAFF).is_err());
    }
}
