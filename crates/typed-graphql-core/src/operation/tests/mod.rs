mod document_type_map_tests;
mod normalizer_tests;
mod printer_tests;
mod variable_inference_tests;
