// ==========================================
// 选修课注册系统 - 领域类型定义
// ==========================================
// 职责: 院系 (Branch) 与角色 (Role) 封闭词表
// 序列化格式: 与数据库存储字符串一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 词表解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// ==========================================
// 院系 (Branch)
// ==========================================
// 管理员只能看到本院系的学生与选修课
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "CSE")]
    Cse,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "EEE")]
    Eee,
    #[serde(rename = "ECE")]
    Ece,
    #[serde(rename = "Mechanical")]
    Mechanical,
    #[serde(rename = "Civil")]
    Civil,
    #[serde(rename = "Chemical")]
    Chemical,
    #[serde(rename = "Bio-Technology")]
    BioTechnology,
    #[serde(rename = "AIML")]
    Aiml,
    #[serde(rename = "CSE-AIML")]
    CseAiml,
    #[serde(rename = "CET")]
    Cet,
    #[serde(rename = "AIDS")]
    Aids,
}

impl Branch {
    /// 全部院系（管理员初始化按此顺序）
    pub const ALL: [Branch; 12] = [
        Branch::Cse,
        Branch::It,
        Branch::Eee,
        Branch::Ece,
        Branch::Mechanical,
        Branch::Civil,
        Branch::Chemical,
        Branch::BioTechnology,
        Branch::Aiml,
        Branch::CseAiml,
        Branch::Cet,
        Branch::Aids,
    ];

    /// 数据库/展示用字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Cse => "CSE",
            Branch::It => "IT",
            Branch::Eee => "EEE",
            Branch::Ece => "ECE",
            Branch::Mechanical => "Mechanical",
            Branch::Civil => "Civil",
            Branch::Chemical => "Chemical",
            Branch::BioTechnology => "Bio-Technology",
            Branch::Aiml => "AIML",
            Branch::CseAiml => "CSE-AIML",
            Branch::Cet => "CET",
            Branch::Aids => "AIDS",
        }
    }

    /// 小写字母数字形式，用于生成管理员账号（如 "Bio-Technology" → "biotechnology"）
    pub fn slug(&self) -> String {
        self.as_str()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Branch::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownVariant {
                kind: "branch",
                value: trimmed.to_string(),
            })
    }
}

// ==========================================
// 角色 (Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_roundtrip_all() {
        for branch in Branch::ALL {
            assert_eq!(branch.as_str().parse::<Branch>().unwrap(), branch);
        }
    }

    #[test]
    fn test_branch_parse_case_insensitive() {
        assert_eq!("cse".parse::<Branch>().unwrap(), Branch::Cse);
        assert_eq!(" bio-technology ".parse::<Branch>().unwrap(), Branch::BioTechnology);
        assert!("Aero".parse::<Branch>().is_err());
    }

    #[test]
    fn test_branch_slug() {
        assert_eq!(Branch::BioTechnology.slug(), "biotechnology");
        assert_eq!(Branch::CseAiml.slug(), "cseaiml");
        assert_eq!(Branch::Cse.slug(), "cse");
    }

    #[test]
    fn test_branch_serde_uses_display_name() {
        let json = serde_json::to_string(&Branch::CseAiml).unwrap();
        assert_eq!(json, "\"CSE-AIML\"");
        let role = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(role, "\"admin\"");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("professor".parse::<Role>().is_err());
    }
}
