use image::{Rgb, RgbImage};
use ndarray::prelude::*;

use crate::labels::{CategoryToggles, NUM_LABELS};

/// ラベルグリッドをカテゴリトグルで二値マスクへ変換する
///
/// 有効カテゴリに属するラベルの画素だけが 1 になる。Background と
/// Sunglasses はカテゴリを持たないため常に 0。対応表による集合所属
/// 判定のみで、画素ごとの分岐は持たない。
pub fn build_mask(labels: ArrayView2<u8>, toggles: &CategoryToggles) -> Array2<u8> {
    let kept = toggles.kept_labels();
    labels.map(|&id| u8::from((id as usize) < NUM_LABELS && kept[id as usize]))
}

/// 二値マスクを {0,255} の3チャンネル画像に展開する
pub fn mask_to_image(mask: ArrayView2<u8>) -> RgbImage {
    let (height, width) = mask.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let value = mask[[y as usize, x as usize]] * 255;
        Rgb([value, value, value])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{Category, Label, CATEGORY_LABELS, NUM_CATEGORIES};

    fn toggles_from_bits(bits: u16) -> CategoryToggles {
        let mut toggles = CategoryToggles::all(false);
        for (index, (category, _)) in CATEGORY_LABELS.iter().enumerate() {
            if bits & (1 << index) != 0 {
                toggles = toggles.with(*category, true);
            }
        }
        toggles
    }

    fn grid_of_all_labels() -> Array2<u8> {
        // 1x18: 各ラベルを1画素ずつ
        Array2::from_shape_fn((1, NUM_LABELS), |(_, x)| x as u8)
    }

    #[test]
    fn test_background_never_positive_for_any_toggle_combination() {
        let grid = grid_of_all_labels();
        for bits in 0..(1u16 << NUM_CATEGORIES) {
            let mask = build_mask(grid.view(), &toggles_from_bits(bits));
            assert_eq!(mask[[0, Label::Background.id() as usize]], 0);
        }
    }

    #[test]
    fn test_sunglasses_never_positive_for_any_toggle_combination() {
        let grid = grid_of_all_labels();
        for bits in 0..(1u16 << NUM_CATEGORIES) {
            let mask = build_mask(grid.view(), &toggles_from_bits(bits));
            assert_eq!(mask[[0, Label::Sunglasses.id() as usize]], 0);
        }
    }

    #[test]
    fn test_single_toggle_only_affects_its_own_labels() {
        let grid = grid_of_all_labels();
        let baseline = build_mask(grid.view(), &CategoryToggles::default());

        for (category, labels) in &CATEGORY_LABELS {
            let mask = build_mask(
                grid.view(),
                &CategoryToggles::default().with(*category, false),
            );
            for id in 0..NUM_LABELS {
                let owned = labels.iter().any(|l| l.id() as usize == id);
                if owned {
                    // positive→zero のみ
                    assert_eq!(baseline[[0, id]], 1);
                    assert_eq!(mask[[0, id]], 0);
                } else {
                    assert_eq!(mask[[0, id]], baseline[[0, id]]);
                }
            }
        }
    }

    #[test]
    fn test_filter_is_deterministic() {
        let grid = Array2::from_shape_fn((16, 16), |(y, x)| ((y * 16 + x) % NUM_LABELS) as u8);
        let toggles = CategoryToggles::default().with(Category::Leg, false);

        let first = build_mask(grid.view(), &toggles);
        let second = build_mask(grid.view(), &toggles);
        assert_eq!(first, second);
    }

    #[test]
    fn test_upper_clothes_disabled_scenario() {
        // {0,4,11} のグリッドで Upper_clothes=false → label 11 のみ正
        let grid = ndarray::array![
            [0u8, 4, 11],
            [4, 11, 0],
            [11, 0, 4],
        ];
        let toggles = CategoryToggles::default().with(Category::UpperClothes, false);
        let mask = build_mask(grid.view(), &toggles);

        for ((y, x), &label) in grid.indexed_iter() {
            let expected = u8::from(label == Label::Face.id());
            assert_eq!(mask[[y, x]], expected);
        }
    }

    #[test]
    fn test_all_toggles_true_keeps_everything_but_background_and_sunglasses() {
        let grid = grid_of_all_labels();
        let mask = build_mask(grid.view(), &CategoryToggles::default());
        for id in 0..NUM_LABELS {
            let expected = u8::from(id != 0 && id != 3);
            assert_eq!(mask[[0, id]], expected, "label {id}");
        }
    }

    #[test]
    fn test_all_toggles_false_yields_empty_mask() {
        let grid = grid_of_all_labels();
        let mask = build_mask(grid.view(), &CategoryToggles::all(false));
        assert!(mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_mask_image_encoding() {
        let mask = ndarray::array![[0u8, 1], [1, 0]];
        let image = mask_to_image(mask.view());

        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(0, 1), &Rgb([255, 255, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }
}
