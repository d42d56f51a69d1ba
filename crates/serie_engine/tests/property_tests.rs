//! Property tests for label ordering and rotation

use proptest::prelude::*;
use serie_engine::{
    flatten_label_order, label_rotation, rebuild_labels, Chart, EngineConfig, LabelPool,
    LabelStyle, Serie, SerieData, SerieType, VisualPool,
};

/// Build a series of roots, each followed by its direct children
fn forest(child_counts: &[usize]) -> Serie {
    let mut data = Vec::new();
    for (root, &count) in child_counts.iter().enumerate() {
        let parent = data.len();
        let children: Vec<usize> = (parent + 1..=parent + count).collect();
        data.push(SerieData::new(format!("root{}", root), vec![0.0, 1.0]).with_children(children));
        for child in 0..count {
            data.push(SerieData::new(
                format!("child{}_{}", root, child),
                vec![0.0, 2.0],
            ));
        }
    }
    Serie::new(0, "Forest", SerieType::Other)
        .with_label(LabelStyle::shown())
        .with_data(data)
}

proptest! {
    #[test]
    fn test_children_follow_parent_contiguously(child_counts in prop::collection::vec(0usize..5, 1..8)) {
        let chart = Chart::default();
        let config = EngineConfig::default();
        let mut pool = LabelPool::new();
        let mut serie = forest(&child_counts);

        let summary = rebuild_labels(&mut serie, &mut pool, &chart, &config).unwrap();
        prop_assert_eq!(summary.visited, serie.data.len());
        prop_assert_eq!(pool.live_count(), serie.data.len());

        for data in serie.data.iter().filter(|d| !d.children.is_empty()) {
            for (offset, &child) in data.children.iter().enumerate() {
                prop_assert_eq!(serie.data[child].index, data.index + offset + 1);
            }
        }
    }

    #[test]
    fn test_flatten_visits_every_point_once(
        children in prop::collection::vec(prop::collection::vec(0usize..12, 0..3), 1..12)
    ) {
        let data = children
            .iter()
            .enumerate()
            .map(|(i, c)| SerieData::new(format!("p{}", i), vec![0.0, 1.0]).with_children(c.clone()))
            .collect();
        let serie = Serie::new(0, "Graph", SerieType::Other).with_data(data);

        let mut order = flatten_label_order(&serie);
        prop_assert_eq!(order.len(), serie.data.len());
        order.sort_unstable();
        prop_assert_eq!(order, (0..serie.data.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_rotation_outside_is_unchanged(rotate in -180.0f64..180.0, angle in 0.0f64..360.0) {
        prop_assert_eq!(label_rotation(rotate, false, angle), rotate);
    }

    #[test]
    fn test_rotation_inside_upright(rotate in 1.0f64..90.0, angle in 0.5f64..360.0) {
        let rotation = label_rotation(rotate, true, angle);
        let expected = if angle > 180.0 {
            rotate + 270.0 - angle
        } else {
            rotate - (angle - 90.0)
        };
        prop_assert!((rotation - expected).abs() < 1e-9);
    }
}
