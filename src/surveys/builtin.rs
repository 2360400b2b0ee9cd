// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the survey-launcher project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Schema files every survey runner ships with.

use super::schema::SchemaDescriptor;

pub const BUILTIN_SCHEMAS: &[&str] = &[
    "0_star_wars.json",
    "1_0005.json",
    "1_0102.json",
    "1_0112.json",
    "1_0203.json",
    "1_0205.json",
    "1_0213.json",
    "1_0215.json",
    "2_0001.json",
    "census_communal.json",
    "census_household.json",
    "census_individual.json",
    "e_commerce.json",
    "mbs_0111.json",
    "mbs_0117.json",
    "mbs_0123.json",
    "mbs_0167.json",
    "mbs_0173.json",
    "mbs_0205.json",
    "mbs_0216.json",
    "mbs_0255.json",
    "mbs_0817.json",
    "mbs_0867.json",
    "multiple_answers.json",
    "test_big_list_naughty_strings.json",
    "test_checkbox.json",
    "test_conditional_dates.json",
    "test_conditional_routing.json",
    "test_confirmation_question.json",
    "test_currency.json",
    "test_date_range_period_validation.json",
    "test_dates.json",
    "test_default.json",
    "test_dependencies_calculation.json",
    "test_dependencies_max_value.json",
    "test_dependencies_min_value.json",
    "test_difference_in_years.json",
    "test_difference_in_years_month_year.json",
    "test_difference_in_years_month_year_range.json",
    "test_difference_in_years_range.json",
    "test_dropdown_mandatory.json",
    "test_dropdown_mandatory_with_overridden_error.json",
    "test_dropdown_optional.json",
    "test_error_messages.json",
    "test_final_confirmation.json",
    "test_household_question.json",
    "test_interstitial_page.json",
    "test_introduction.json",
    "test_language.json",
    "test_language_cy.json",
    "test_markup.json",
    "test_metadata_routing.json",
    "test_multiple_piping.json",
    "test_navigation.json",
    "test_navigation_completeness.json",
    "test_navigation_confirmation.json",
    "test_navigation_routing.json",
    "test_numbers.json",
    "test_percentage.json",
    "test_question_guidance.json",
    "test_radio_checkbox_descriptions.json",
    "test_radio_mandatory.json",
    "test_radio_mandatory_with_mandatory_other.json",
    "test_radio_mandatory_with_mandatory_other_overridden_error.json",
    "test_radio_mandatory_with_optional_other.json",
    "test_radio_mandatory_with_overridden_error.json",
    "test_radio_optional.json",
    "test_radio_optional_with_mandatory_other.json",
    "test_radio_optional_with_mandatory_other_overridden_error.json",
    "test_radio_optional_with_optional_other.json",
    "test_relationship_household.json",
    "test_repeating_and_conditional_routing.json",
    "test_repeating_household.json",
    "test_routing_date_equals.json",
    "test_routing_date_greater_than.json",
    "test_routing_date_less_than.json",
    "test_routing_date_not_equals.json",
    "test_routing_group.json",
    "test_routing_number_equals.json",
    "test_routing_number_greater_than.json",
    "test_routing_number_greater_than_or_equal.json",
    "test_routing_number_less_than.json",
    "test_routing_number_less_than_or_equal.json",
    "test_routing_number_not_equals.json",
    "test_routing_on_multiple_select.json",
    "test_single_date_period_validation.json",
    "test_skip_condition.json",
    "test_skip_condition_block.json",
    "test_skip_condition_group.json",
    "test_summary.json",
    "test_section_summary.json",
    "test_sum_equal_validation_against_total.json",
    "test_sum_equal_or_less_validation_against_total.json",
    "test_sum_less_validation_against_total.json",
    "test_sum_multi_validation_against_total.json",
    "test_view_submitted_response.json",
    "test_textarea.json",
    "test_textfield.json",
    "test_timeout.json",
    "test_total_breakdown.json",
    "test_unit_patterns.json",
];

/// Descriptors for [`BUILTIN_SCHEMAS`], in listing order.
pub fn builtin_schemas() -> Vec<SchemaDescriptor> {
    BUILTIN_SCHEMAS
        .iter()
        .map(|name| SchemaDescriptor::from_filename(name))
        .collect()
}
