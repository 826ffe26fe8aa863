// ==========================================
// 物料需求计划求解器 - 资源领域模型
// ==========================================
// 依据: MRP_Engine_Specs_v0.2.md - 4.4 后处理 (换型矩阵)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SetupMatrix - 换型矩阵
// ==========================================
// 记录 (前一换型状态, 目标换型状态) -> 实际换型名 的规则表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupMatrix {
    pub name: String,
    pub rules: Vec<SetupRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRule {
    pub from: String,  // 前一状态 (空串 = 任意)
    pub to: String,    // 目标状态 (空串 = 任意)
    pub setup: String, // 规则命中时的实际换型名
}

impl SetupMatrix {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        setup: impl Into<String>,
    ) -> Self {
        self.rules.push(SetupRule {
            from: from.into(),
            to: to.into(),
            setup: setup.into(),
        });
        self
    }

    /// 按规则表顺序匹配换型, 首个命中生效
    pub fn lookup(&self, from: &str, to: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| {
                (r.from.is_empty() || r.from == from) && (r.to.is_empty() || r.to == to)
            })
            .map(|r| r.setup.as_str())
    }
}

// ==========================================
// Resource - 资源
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,                      // 资源唯一标识
    pub cluster: usize,                    // 所属集群编号 (外部赋值)
    pub setup_matrix: Option<SetupMatrix>, // 换型矩阵 (设有矩阵的资源参与后处理)
}

impl Resource {
    pub fn new(name: impl Into<String>, cluster: usize) -> Self {
        Self {
            name: name.into(),
            cluster,
            setup_matrix: None,
        }
    }

    pub fn with_setup_matrix(mut self, matrix: SetupMatrix) -> Self {
        self.setup_matrix = Some(matrix);
        self
    }
}
