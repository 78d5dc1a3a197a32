/// SegFormer-B2 clothes が出力する18クラスのラベル定義
///
/// モデル出力のチャンネル順に対応する固定列挙。変更不可。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Label {
    Background = 0,
    Hat = 1,
    Hair = 2,
    Sunglasses = 3,
    UpperClothes = 4,
    Skirt = 5,
    Pants = 6,
    Dress = 7,
    Belt = 8,
    LeftShoe = 9,
    RightShoe = 10,
    Face = 11,
    LeftLeg = 12,
    RightLeg = 13,
    LeftArm = 14,
    RightArm = 15,
    Bag = 16,
    Scarf = 17,
}

pub const NUM_LABELS: usize = 18;

impl Label {
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Background),
            1 => Some(Self::Hat),
            2 => Some(Self::Hair),
            3 => Some(Self::Sunglasses),
            4 => Some(Self::UpperClothes),
            5 => Some(Self::Skirt),
            6 => Some(Self::Pants),
            7 => Some(Self::Dress),
            8 => Some(Self::Belt),
            9 => Some(Self::LeftShoe),
            10 => Some(Self::RightShoe),
            11 => Some(Self::Face),
            12 => Some(Self::LeftLeg),
            13 => Some(Self::RightLeg),
            14 => Some(Self::LeftArm),
            15 => Some(Self::RightArm),
            16 => Some(Self::Bag),
            17 => Some(Self::Scarf),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Hat => "Hat",
            Self::Hair => "Hair",
            Self::Sunglasses => "Sunglasses",
            Self::UpperClothes => "Upper-clothes",
            Self::Skirt => "Skirt",
            Self::Pants => "Pants",
            Self::Dress => "Dress",
            Self::Belt => "Belt",
            Self::LeftShoe => "Left-shoe",
            Self::RightShoe => "Right-shoe",
            Self::Face => "Face",
            Self::LeftLeg => "Left-leg",
            Self::RightLeg => "Right-leg",
            Self::LeftArm => "Left-arm",
            Self::RightArm => "Right-arm",
            Self::Bag => "Bag",
            Self::Scarf => "Scarf",
        }
    }
}

/// ユーザー向けのカテゴリ。shoe/leg/arm は左右2ラベルを束ねる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Face,
    Hat,
    Hair,
    UpperClothes,
    Skirt,
    Pants,
    Dress,
    Belt,
    Shoe,
    Leg,
    Arm,
    Bag,
    Scarf,
}

pub const NUM_CATEGORIES: usize = 13;

/// カテゴリ→ラベルの固定対応表
///
/// Background(0) と Sunglasses(3) はどのカテゴリにも属さないため、
/// マスクの正領域には決して入らない。
pub const CATEGORY_LABELS: [(Category, &[Label]); NUM_CATEGORIES] = [
    (Category::Face, &[Label::Face]),
    (Category::Hat, &[Label::Hat]),
    (Category::Hair, &[Label::Hair]),
    (Category::UpperClothes, &[Label::UpperClothes]),
    (Category::Skirt, &[Label::Skirt]),
    (Category::Pants, &[Label::Pants]),
    (Category::Dress, &[Label::Dress]),
    (Category::Belt, &[Label::Belt]),
    (Category::Shoe, &[Label::LeftShoe, Label::RightShoe]),
    (Category::Leg, &[Label::LeftLeg, Label::RightLeg]),
    (Category::Arm, &[Label::LeftArm, Label::RightArm]),
    (Category::Bag, &[Label::Bag]),
    (Category::Scarf, &[Label::Scarf]),
];

/// Per-invocation boolean toggles, one per category.
///
/// Mirrors the node's input schema: every toggle defaults to `true`
/// (category kept in the mask). Immutable within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryToggles {
    pub face: bool,
    pub hat: bool,
    pub hair: bool,
    pub upper_clothes: bool,
    pub skirt: bool,
    pub pants: bool,
    pub dress: bool,
    pub belt: bool,
    pub shoe: bool,
    pub leg: bool,
    pub arm: bool,
    pub bag: bool,
    pub scarf: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl CategoryToggles {
    pub const fn all(enabled: bool) -> Self {
        Self {
            face: enabled,
            hat: enabled,
            hair: enabled,
            upper_clothes: enabled,
            skirt: enabled,
            pants: enabled,
            dress: enabled,
            belt: enabled,
            shoe: enabled,
            leg: enabled,
            arm: enabled,
            bag: enabled,
            scarf: enabled,
        }
    }

    pub const fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Face => self.face,
            Category::Hat => self.hat,
            Category::Hair => self.hair,
            Category::UpperClothes => self.upper_clothes,
            Category::Skirt => self.skirt,
            Category::Pants => self.pants,
            Category::Dress => self.dress,
            Category::Belt => self.belt,
            Category::Shoe => self.shoe,
            Category::Leg => self.leg,
            Category::Arm => self.arm,
            Category::Bag => self.bag,
            Category::Scarf => self.scarf,
        }
    }

    pub fn with(mut self, category: Category, enabled: bool) -> Self {
        match category {
            Category::Face => self.face = enabled,
            Category::Hat => self.hat = enabled,
            Category::Hair => self.hair = enabled,
            Category::UpperClothes => self.upper_clothes = enabled,
            Category::Skirt => self.skirt = enabled,
            Category::Pants => self.pants = enabled,
            Category::Dress => self.dress = enabled,
            Category::Belt => self.belt = enabled,
            Category::Shoe => self.shoe = enabled,
            Category::Leg => self.leg = enabled,
            Category::Arm => self.arm = enabled,
            Category::Bag => self.bag = enabled,
            Category::Scarf => self.scarf = enabled,
        }
        self
    }

    /// ラベルID→マスク採用可否のルックアップテーブル
    ///
    /// 有効カテゴリに属するラベルだけが true になる。対応表に無い
    /// Background/Sunglasses は常に false。
    pub fn kept_labels(&self) -> [bool; NUM_LABELS] {
        let mut kept = [false; NUM_LABELS];
        for (category, labels) in &CATEGORY_LABELS {
            if self.is_enabled(*category) {
                for label in *labels {
                    kept[label.id() as usize] = true;
                }
            }
        }
        kept
    }

    /// 抑制対象ラベルの一覧（Background 常時 + 無効カテゴリのラベル）
    ///
    /// ログ出力・デバッグ用。
    pub fn suppressed_labels(&self) -> Vec<Label> {
        let mut suppressed = vec![Label::Background];
        for (category, labels) in &CATEGORY_LABELS {
            if !self.is_enabled(*category) {
                suppressed.extend_from_slice(labels);
            }
        }
        suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_id_roundtrip() {
        for id in 0..NUM_LABELS as u8 {
            let label = Label::from_id(id).unwrap();
            assert_eq!(label.id(), id);
        }
        assert!(Label::from_id(18).is_none());
    }

    #[test]
    fn test_category_table_covers_all_flagged_labels() {
        let mut covered = [false; NUM_LABELS];
        for (_, labels) in &CATEGORY_LABELS {
            for label in *labels {
                assert!(!covered[label.id() as usize], "label mapped twice");
                covered[label.id() as usize] = true;
            }
        }
        // Background と Sunglasses のみが対応表に無い
        let unmapped: Vec<_> = (0..NUM_LABELS)
            .filter(|&i| !covered[i])
            .collect();
        assert_eq!(unmapped, vec![0, 3]);
    }

    #[test]
    fn test_default_toggles_keep_all_categories() {
        let kept = CategoryToggles::default().kept_labels();
        assert!(!kept[Label::Background.id() as usize]);
        assert!(!kept[Label::Sunglasses.id() as usize]);
        for id in [1u8, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17] {
            assert!(kept[id as usize], "label {id} should be kept");
        }
    }

    #[test]
    fn test_disabled_category_removes_only_its_labels() {
        let kept = CategoryToggles::default()
            .with(Category::Shoe, false)
            .kept_labels();
        assert!(!kept[Label::LeftShoe.id() as usize]);
        assert!(!kept[Label::RightShoe.id() as usize]);
        assert!(kept[Label::UpperClothes.id() as usize]);
        assert!(kept[Label::Face.id() as usize]);
    }

    #[test]
    fn test_suppressed_labels_always_contain_background() {
        assert_eq!(
            CategoryToggles::default().suppressed_labels(),
            vec![Label::Background]
        );

        let suppressed = CategoryToggles::default()
            .with(Category::Arm, false)
            .suppressed_labels();
        assert_eq!(
            suppressed,
            vec![Label::Background, Label::LeftArm, Label::RightArm]
        );
    }

    #[test]
    fn test_all_false_suppresses_every_mapped_label() {
        let kept = CategoryToggles::all(false).kept_labels();
        assert!(kept.iter().all(|&k| !k));

        let suppressed = CategoryToggles::all(false).suppressed_labels();
        // Background + 16 mapped labels; Sunglasses は対応表に無いので含まれない
        assert_eq!(suppressed.len(), 17);
        assert!(!suppressed.contains(&Label::Sunglasses));
    }
}
