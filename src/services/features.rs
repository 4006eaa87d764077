use ndarray::{Array1, Array2};

use crate::ml::{EncodeError, OneHotEncoder};
use crate::models::{PlayerProfile, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};

/// Fits the categorical encoder on every profile
pub fn fit_encoder<'a, I>(profiles: I) -> Result<OneHotEncoder, EncodeError>
where
    I: IntoIterator<Item = &'a PlayerProfile>,
{
    let rows: Vec<[&str; 4]> = profiles
        .into_iter()
        .map(|p| p.categorical_values())
        .collect();
    OneHotEncoder::fit(&CATEGORICAL_COLUMNS, &rows)
}

/// Number of model inputs produced by `encoder`
pub fn feature_width(encoder: &OneHotEncoder) -> usize {
    encoder.n_features() + NUMERIC_COLUMNS.len()
}

/// Encoded categoricals followed by the raw numeric fields
pub fn feature_row(
    encoder: &OneHotEncoder,
    profile: &PlayerProfile,
) -> Result<Array1<f64>, EncodeError> {
    let mut row = encoder.transform(&profile.categorical_values())?;
    row.extend(profile.numeric_values());
    Ok(Array1::from(row))
}

pub fn feature_matrix<'a, I>(encoder: &OneHotEncoder, profiles: I) -> Result<Array2<f64>, EncodeError>
where
    I: IntoIterator<Item = &'a PlayerProfile>,
    I::IntoIter: ExactSizeIterator,
{
    let profiles = profiles.into_iter();
    let mut matrix = Array2::zeros((profiles.len(), feature_width(encoder)));
    for (mut target, profile) in matrix.rows_mut().into_iter().zip(profiles) {
        target.assign(&feature_row(encoder, profile)?);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AimType, MapName, Playstyle, Role};

    fn profile(playstyle: Playstyle, map: MapName) -> PlayerProfile {
        PlayerProfile {
            playstyle,
            preferred_role: Role::Duelist,
            favorite_map: map,
            aim_type: AimType::Precise,
            edpi: 320,
            ability_usage: 5,
            aggressiveness: 7,
            hours_played: 200,
        }
    }

    #[test]
    fn test_numeric_fields_follow_encoded_categoricals() {
        let profiles = vec![
            profile(Playstyle::Aggressive, MapName::Ascent),
            profile(Playstyle::Passive, MapName::Bind),
        ];
        let encoder = fit_encoder(&profiles).unwrap();
        // 2 playstyles + 1 role + 2 maps + 1 aim type
        assert_eq!(encoder.n_features(), 6);
        assert_eq!(feature_width(&encoder), 10);

        let row = feature_row(&encoder, &profiles[1]).unwrap();
        assert_eq!(row.to_vec(), vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 320.0, 5.0, 7.0, 200.0]);

        let matrix = feature_matrix(&encoder, &profiles).unwrap();
        assert_eq!(matrix.dim(), (2, 10));
        assert_eq!(matrix.row(1), row);
    }

    #[test]
    fn test_unseen_map_fails_encoding() {
        let profiles = vec![profile(Playstyle::Aggressive, MapName::Ascent)];
        let encoder = fit_encoder(&profiles).unwrap();
        let err = feature_row(&encoder, &profile(Playstyle::Aggressive, MapName::Icebox)).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownCategory { .. }));
    }
}
