use super::Role;
use crate::entities::departments;

/// Who performs a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// `None` for the CLI and the scheduler.
    pub user_id: Option<i32>,
    pub role: Role,
    pub department_id: Option<i32>,
    pub base_id: Option<i32>,
}

impl Actor {
    /// Unrestricted actor for maintenance commands and background jobs.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            user_id: None,
            role: Role::SuperAdmin,
            department_id: None,
            base_id: None,
        }
    }

    #[must_use]
    pub fn is_any(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    #[must_use]
    pub fn can_manage_base(&self, base_id: i32) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::HqCommander => self.base_id == Some(base_id),
            Role::DeptCommander | Role::Soldier => false,
        }
    }

    /// Department commanders manage their own department, HQ commanders
    /// every department of their base.
    #[must_use]
    pub fn can_manage_department(&self, department: &departments::Model) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::HqCommander => self.base_id == Some(department.base_id),
            Role::DeptCommander => self.department_id == Some(department.id),
            Role::Soldier => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn department(id: i32, base_id: i32) -> departments::Model {
        departments::Model {
            id,
            base_id,
            name: "נשקייה".to_string(),
            allow_immediate: true,
            allow_scheduled: true,
            auto_approve_requests: false,
            is_hq: false,
            created_at: Utc::now(),
        }
    }

    fn actor(role: Role, department_id: i32, base_id: i32) -> Actor {
        Actor {
            user_id: Some(1),
            role,
            department_id: Some(department_id),
            base_id: Some(base_id),
        }
    }

    #[test]
    fn test_department_scope_by_role() {
        let armory = department(3, 1);
        let elsewhere = department(4, 2);

        assert!(actor(Role::DeptCommander, 3, 1).can_manage_department(&armory));
        assert!(!actor(Role::DeptCommander, 5, 1).can_manage_department(&armory));
        assert!(actor(Role::HqCommander, 9, 1).can_manage_department(&armory));
        assert!(!actor(Role::HqCommander, 9, 1).can_manage_department(&elsewhere));
        assert!(!actor(Role::Soldier, 3, 1).can_manage_department(&armory));
        assert!(Actor::system().can_manage_department(&elsewhere));
    }
}
