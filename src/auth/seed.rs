// ==========================================
// 选修课注册系统 - 院系管理员初始化
// ==========================================
// 每个院系一个管理员: admin<院系slug>001 / "<院系> Admin"
// 幂等: 已有管理员的院系跳过
// ==========================================

use crate::auth::error::AuthResult;
use crate::auth::hasher::CredentialHasher;
use crate::config::RegistrationConfigReader;
use crate::domain::student::NewStudentRecord;
use crate::domain::types::{Branch, Role};
use crate::repository::student_repo::StudentRepository;
use tracing::info;

/// 管理员账号的学号
pub fn admin_roll_no(branch: Branch) -> String {
    format!("admin{}001", branch.slug())
}

/// 为缺少管理员的院系创建管理员账号，返回新建数量
pub async fn seed_branch_admins(
    students: &StudentRepository,
    hasher: &dyn CredentialHasher,
    config: &dyn RegistrationConfigReader,
) -> AuthResult<usize> {
    let password = config.get_seed_admin_password().await?;
    let mut created = 0;

    for branch in Branch::ALL {
        if students.find_admin_by_branch(branch)?.is_some() {
            continue;
        }
        let roll_no = admin_roll_no(branch);
        if students.find_by_roll_no(&roll_no)?.is_some() {
            // 学号已被普通账号占用，不覆盖
            tracing::warn!(roll_no = %roll_no, branch = %branch, "管理员学号已被占用，跳过");
            continue;
        }

        students.insert(&NewStudentRecord {
            roll_no: roll_no.clone(),
            name: format!("{} Admin", branch),
            section: "Admin".to_string(),
            semester: 0,
            branch,
            password_hash: hasher.hash(&password)?,
            role: Role::Admin,
        })?;
        info!(roll_no = %roll_no, branch = %branch, "已创建院系管理员");
        created += 1;
    }

    Ok(created)
}
